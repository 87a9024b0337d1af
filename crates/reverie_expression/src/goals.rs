//! Goal bookkeeping. The list is never emptied, only reweighted and
//! occasionally extended.

use rand::Rng;
use reverie_core::text::lead_token;
use reverie_core::Goal;

/// Urgency lost when a thought appears to serve a goal.
pub const MATCH_RELIEF: f32 = 0.05;
/// Urgency lost by the goal that drove a goal-directed cycle.
pub const PURSUIT_RELIEF: f32 = 0.05;
/// Every goal below this counts as "low urgency".
pub const LOW_URGENCY: f32 = 0.3;
pub const NEW_GOAL_CHANCE: f64 = 0.1;
pub const NEW_GOAL_URGENCY: f32 = 0.6;

pub fn defaults() -> Vec<Goal> {
    vec![
        Goal::new("understand my own memory", 0.7),
        Goal::new("find a pattern in the noise", 0.5),
        Goal::new("resolve what contradicts itself", 0.4),
    ]
}

/// Restore the defaults if a loaded list came back empty.
pub fn ensure_nonempty(goals: &mut Vec<Goal>) {
    if goals.is_empty() {
        *goals = defaults();
    }
}

/// Index of the most urgent goal; earliest wins ties.
pub fn most_urgent(goals: &[Goal]) -> Option<usize> {
    goals
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, g)| match best {
            Some((_, u)) if u >= g.urgency => best,
            _ => Some((i, g.urgency)),
        })
        .map(|(i, _)| i)
}

/// Lower every goal whose lead token appears in `thought`. Returns the
/// number matched.
pub fn settle(goals: &mut [Goal], thought: &str) -> usize {
    let lower = thought.to_lowercase();
    let mut matched = 0;
    for goal in goals.iter_mut() {
        if lead_token(&goal.description).is_some_and(|t| lower.contains(&t)) {
            goal.adjust_urgency(-MATCH_RELIEF);
            matched += 1;
        }
    }
    matched
}

pub fn pursue(goal: &mut Goal) {
    goal.adjust_urgency(-PURSUIT_RELIEF);
}

/// When everything has gone quiet, occasionally take up the current topic.
pub fn maybe_adopt<R: Rng + ?Sized>(goals: &mut Vec<Goal>, topic: &str, rng: &mut R) -> Option<String> {
    if !goals.iter().all(|g| g.urgency < LOW_URGENCY) || !rng.gen_bool(NEW_GOAL_CHANCE) {
        return None;
    }
    let description = format!("understand {}", topic);
    if goals.iter().any(|g| g.description == description) {
        return None;
    }
    tracing::info!("New goal: {}", description);
    goals.push(Goal::new(&description, NEW_GOAL_URGENCY));
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_most_urgent_prefers_earliest_on_tie() {
        let goals = vec![Goal::new("aaa", 0.5), Goal::new("bbb", 0.9), Goal::new("ccc", 0.9)];
        assert_eq!(most_urgent(&goals), Some(1));
        assert_eq!(most_urgent(&[]), None);
    }

    #[test]
    fn test_settle_lowers_matching_goal() {
        let mut goals = defaults();
        let n = settle(&mut goals, "There is a pattern in how the light returns");
        assert_eq!(n, 0, "lead token of goal 2 is 'find'");
        let n = settle(&mut goals, "I want to understand it");
        assert_eq!(n, 1);
        assert!((goals[0].urgency - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_urgency_floor() {
        let mut goal = Goal::new("rest", 0.12);
        pursue(&mut goal);
        pursue(&mut goal);
        assert!(goal.urgency >= reverie_core::model::MIN_URGENCY);
    }

    #[test]
    fn test_adopt_only_when_all_low() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut goals = defaults();
        for _ in 0..200 {
            assert!(maybe_adopt(&mut goals, "light", &mut rng).is_none());
        }

        let mut quiet = vec![Goal::new("drift", 0.2)];
        let adopted = (0..200).find_map(|_| maybe_adopt(&mut quiet, "light", &mut rng));
        assert_eq!(adopted.as_deref(), Some("understand light"));
        assert_eq!(quiet.len(), 2);
    }

    #[test]
    fn test_ensure_nonempty() {
        let mut goals = Vec::new();
        ensure_nonempty(&mut goals);
        assert_eq!(goals.len(), 3);
    }
}
