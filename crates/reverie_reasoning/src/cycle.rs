//! Cycle selection as a priority-ordered decision table.
//!
//! Every rule is tried in order. What happens after a rule fires depends on
//! its [`Flow`]: most rules end the search, the subconscious rule narrows
//! the remaining search to the periodic checks, and the schema check lets
//! the search continue.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const GOAL_CHANCE: f64 = 0.25;
pub const SUBCONSCIOUS_EVERY: u64 = 10;
pub const SCHEMA_EVERY: u64 = 5;
pub const SELF_INSPECTION_EVERY: u64 = 6;
/// Schema formation needs maturity strictly above this.
pub const SCHEMA_MATURITY: f32 = 0.2;

/// One unit of work inside a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dream,
    Subconscious,
    SchemaCheck,
    SelfInspection,
    Goal,
    Normal,
}

/// What a finished cycle is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleKind {
    Dream,
    Subconscious,
    Schema,
    SelfInspection,
    Goal,
    Normal,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Dream => "dream",
            Self::Subconscious => "subconscious",
            Self::Schema => "schema",
            Self::SelfInspection => "self-inspection",
            Self::Goal => "goal",
            Self::Normal => "normal",
        };
        f.write_str(s)
    }
}

impl From<Stage> for CycleKind {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Dream => Self::Dream,
            Stage::Subconscious => Self::Subconscious,
            Stage::SchemaCheck => Self::Schema,
            Stage::SelfInspection => Self::SelfInspection,
            Stage::Goal => Self::Goal,
            Stage::Normal => Self::Normal,
        }
    }
}

/// What the table looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleInputs {
    pub dream_chance: f32,
    /// Lifetime committed fragment count
    pub committed: u64,
    pub maturity: f32,
    pub has_goal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Stop here; the stuck check is skipped.
    EndEarly,
    /// Keep going, but only through periodic checks.
    ChecksOnly,
    Continue,
    /// Stop here; the stuck check runs.
    Finish,
}

struct Rule {
    stage: Stage,
    /// Periodic checks still run after [`Flow::ChecksOnly`].
    periodic: bool,
    fires: fn(&CycleInputs, &mut dyn RngCore) -> bool,
    flow: Flow,
}

fn every(count: u64, n: u64) -> bool {
    count > 0 && count % n == 0
}

fn dream_roll(i: &CycleInputs, rng: &mut dyn RngCore) -> bool {
    rng.gen::<f32>() < i.dream_chance
}

fn subconscious_due(i: &CycleInputs, _: &mut dyn RngCore) -> bool {
    every(i.committed, SUBCONSCIOUS_EVERY)
}

fn schema_due(i: &CycleInputs, _: &mut dyn RngCore) -> bool {
    every(i.committed, SCHEMA_EVERY) && i.maturity > SCHEMA_MATURITY
}

fn inspection_due(i: &CycleInputs, _: &mut dyn RngCore) -> bool {
    every(i.committed, SELF_INSPECTION_EVERY)
}

fn goal_roll(i: &CycleInputs, rng: &mut dyn RngCore) -> bool {
    i.has_goal && rng.gen_bool(GOAL_CHANCE)
}

fn always(_: &CycleInputs, _: &mut dyn RngCore) -> bool {
    true
}

const RULES: &[Rule] = &[
    Rule { stage: Stage::Dream, periodic: false, fires: dream_roll, flow: Flow::EndEarly },
    Rule { stage: Stage::Subconscious, periodic: true, fires: subconscious_due, flow: Flow::ChecksOnly },
    Rule { stage: Stage::SchemaCheck, periodic: true, fires: schema_due, flow: Flow::Continue },
    Rule { stage: Stage::SelfInspection, periodic: true, fires: inspection_due, flow: Flow::EndEarly },
    Rule { stage: Stage::Goal, periodic: false, fires: goal_roll, flow: Flow::EndEarly },
    Rule { stage: Stage::Normal, periodic: false, fires: always, flow: Flow::Finish },
];

/// The stages one cycle runs, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePlan {
    pub stages: Vec<Stage>,
    /// Whether the stuck/topic-shift check follows the stages
    pub stuck_check: bool,
}

impl CyclePlan {
    pub fn decide<R: Rng + ?Sized>(inputs: &CycleInputs, rng: &mut R) -> Self {
        let mut rng = RngAdapter(rng);
        let mut stages = Vec::new();
        let mut checks_only = false;
        let mut ended_early = false;

        for rule in RULES {
            if checks_only && !rule.periodic {
                continue;
            }
            if !(rule.fires)(inputs, &mut rng) {
                continue;
            }
            stages.push(rule.stage);
            match rule.flow {
                Flow::Continue => {}
                Flow::ChecksOnly => checks_only = true,
                Flow::EndEarly => {
                    ended_early = true;
                    break;
                }
                Flow::Finish => break,
            }
        }

        Self {
            stages,
            stuck_check: !ended_early,
        }
    }

    /// A plan that runs a single stage, for tests and manual driving.
    pub fn only(stage: Stage) -> Self {
        let stuck_check = RULES
            .iter()
            .find(|r| r.stage == stage)
            .is_some_and(|r| r.flow != Flow::EndEarly);
        Self {
            stages: vec![stage],
            stuck_check,
        }
    }

    pub fn kind(&self) -> CycleKind {
        self.stages
            .iter()
            .copied()
            .find(|s| *s != Stage::SchemaCheck)
            .or_else(|| self.stages.first().copied())
            .map(CycleKind::from)
            .unwrap_or(CycleKind::Normal)
    }
}

/// Lets a `?Sized` generic RNG be handed to the table's plain fn pointers.
struct RngAdapter<'a, R: ?Sized>(&'a mut R);

impl<R: Rng + ?Sized> RngCore for RngAdapter<'_, R> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(committed: u64) -> CycleInputs {
        CycleInputs {
            dream_chance: 0.0,
            committed,
            maturity: 1.0,
            has_goal: false,
        }
    }

    fn plan(i: CycleInputs) -> CyclePlan {
        CyclePlan::decide(&i, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_dream_wins_over_everything() {
        let p = plan(CycleInputs {
            dream_chance: 1.0,
            ..inputs(30)
        });
        assert_eq!(p.stages, vec![Stage::Dream]);
        assert!(!p.stuck_check);
        assert_eq!(p.kind(), CycleKind::Dream);
    }

    #[test]
    fn test_zero_count_never_triggers_periodic() {
        let p = plan(inputs(0));
        assert_eq!(p.stages, vec![Stage::Normal]);
        assert!(p.stuck_check);
    }

    #[test]
    fn test_subconscious_falls_through_to_checks() {
        // 30 is a multiple of 10, 5 and 6.
        let p = plan(inputs(30));
        assert_eq!(
            p.stages,
            vec![Stage::Subconscious, Stage::SchemaCheck, Stage::SelfInspection]
        );
        assert!(!p.stuck_check);
        assert_eq!(p.kind(), CycleKind::Subconscious);
    }

    #[test]
    fn test_subconscious_skips_goal_and_normal() {
        let p = plan(CycleInputs {
            has_goal: true,
            ..inputs(10)
        });
        assert_eq!(p.stages, vec![Stage::Subconscious, Stage::SchemaCheck]);
        assert!(p.stuck_check);
    }

    #[test]
    fn test_schema_needs_maturity() {
        let p = plan(CycleInputs {
            maturity: 0.2,
            ..inputs(5)
        });
        assert_eq!(p.stages, vec![Stage::Normal]);

        let p = plan(inputs(5));
        assert_eq!(p.stages, vec![Stage::SchemaCheck, Stage::Normal]);
        assert_eq!(p.kind(), CycleKind::Normal);
    }

    #[test]
    fn test_self_inspection_ends_early() {
        let p = plan(inputs(12));
        assert_eq!(p.stages, vec![Stage::SelfInspection]);
        assert!(!p.stuck_check);
    }

    #[test]
    fn test_goal_chance_roughly_quarter() {
        let mut rng = StdRng::seed_from_u64(21);
        let i = CycleInputs {
            has_goal: true,
            ..inputs(1)
        };
        let goals = (0..2000)
            .filter(|_| CyclePlan::decide(&i, &mut rng).kind() == CycleKind::Goal)
            .count();
        assert!(goals > 420 && goals < 580, "goal cycles: {}", goals);
    }

    #[test]
    fn test_only_keeps_stuck_check_semantics() {
        assert!(CyclePlan::only(Stage::Normal).stuck_check);
        assert!(!CyclePlan::only(Stage::Dream).stuck_check);
        assert!(!CyclePlan::only(Stage::Goal).stuck_check);
        assert_eq!(CyclePlan::only(Stage::SchemaCheck).kind(), CycleKind::Schema);
    }
}
