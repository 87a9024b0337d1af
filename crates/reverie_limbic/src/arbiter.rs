//! Sub-agent arbitration.
//!
//! Picks which persona dominates the coming cycle. Tension decides first,
//! then mode, then chance.

use rand::Rng;
use reverie_core::{Mode, SubAgent};

const DOUBT: &str = "Doubter";
const LOGIC: &str = "Logician";
const INTUITION: &str = "Dreamer";

pub struct Arbitrator {
    roster: Vec<SubAgent>,
}

impl Default for Arbitrator {
    fn default() -> Self {
        Self::new(SubAgent::roster())
    }
}

impl Arbitrator {
    /// An empty roster is replaced by the default one.
    pub fn new(roster: Vec<SubAgent>) -> Self {
        let roster = if roster.is_empty() {
            SubAgent::roster()
        } else {
            roster
        };
        Self { roster }
    }

    pub fn roster(&self) -> &[SubAgent] {
        &self.roster
    }

    pub fn get(&self, index: usize) -> &SubAgent {
        &self.roster[index.min(self.roster.len() - 1)]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|a| a.name == name)
    }

    /// Select the dominant persona index.
    ///
    /// - tension > 0.6: doubt with p = 0.7
    /// - tension < 0.3: logic with p = 0.5
    /// - dream mode: intuition
    /// - otherwise (or when a draw above misses): uniform over the roster
    pub fn select<R: Rng + ?Sized>(&self, tension: f32, mode: Mode, rng: &mut R) -> usize {
        let preferred = if tension > 0.6 {
            rng.gen_bool(0.7).then_some(DOUBT)
        } else if tension < 0.3 {
            rng.gen_bool(0.5).then_some(LOGIC)
        } else if mode == Mode::Dream {
            Some(INTUITION)
        } else {
            None
        };

        let chosen = preferred
            .and_then(|name| self.index_of(name))
            .unwrap_or_else(|| rng.gen_range(0..self.roster.len()));
        tracing::debug!(
            "Arbitration: tension={:.2}, mode={:?} -> {}",
            tension,
            mode,
            self.roster[chosen].name
        );
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn count(arb: &Arbitrator, tension: f32, mode: Mode, name: &str) -> usize {
        let mut rng = StdRng::seed_from_u64(3);
        (0..1000)
            .filter(|_| arb.get(arb.select(tension, mode, &mut rng)).name == name)
            .count()
    }

    #[test]
    fn test_high_tension_prefers_doubt() {
        let arb = Arbitrator::default();
        // 0.7 + 0.3 * 1/4 = 0.775
        let n = count(&arb, 0.9, Mode::Run, DOUBT);
        assert!(n > 700 && n < 850, "doubt picks: {}", n);
    }

    #[test]
    fn test_low_tension_prefers_logic() {
        let arb = Arbitrator::default();
        // 0.5 + 0.5 * 1/4 = 0.625
        let n = count(&arb, 0.1, Mode::Run, LOGIC);
        assert!(n > 550 && n < 700, "logic picks: {}", n);
    }

    #[test]
    fn test_dream_mode_mid_tension_is_intuition() {
        let arb = Arbitrator::default();
        assert_eq!(count(&arb, 0.45, Mode::Dream, INTUITION), 1000);
    }

    #[test]
    fn test_mid_tension_run_mode_is_uniform() {
        let arb = Arbitrator::default();
        let n = count(&arb, 0.45, Mode::Run, INTUITION);
        assert!(n > 180 && n < 320, "dreamer picks: {}", n);
    }

    #[test]
    fn test_custom_roster_without_roles_falls_back() {
        let mut solo = SubAgent::wanderer();
        solo.name = "Solo".to_string();
        let arb = Arbitrator::new(vec![solo]);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(arb.select(0.9, Mode::Run, &mut rng), 0);
    }
}
