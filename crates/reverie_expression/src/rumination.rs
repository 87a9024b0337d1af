//! Subconscious rumination.
//!
//! Runs when the fragment count lands on a multiple of ten. The mind turns
//! over one unresolved conflict or open question, may quietly firm up a
//! belief, and may ask for an intuition that arrives later.

use crate::concerns::Concerns;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use reverie_core::{Emotion, MemoryFragment};

pub const FRAGMENT_STRENGTH: f32 = 0.4;
pub const REINFORCE_CHANCE: f64 = 0.7;
pub const BELIEF_REINFORCEMENT: f32 = 0.02;
pub const INTUITION_CHANCE: f64 = 0.3;
pub const SOURCE: &str = "subconscious";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubconsciousPlan {
    /// Low-strength fragment to commit, if anything was left to chew on
    pub fragment: Option<MemoryFragment>,
    /// Belief index to reinforce by [`BELIEF_REINFORCEMENT`]
    pub reinforce: Option<usize>,
    /// Whether to request an intuition in the background
    pub request_intuition: bool,
}

impl SubconsciousPlan {
    /// Three independent draws. The conflict/question choice is a coin flip;
    /// if the chosen side is empty the other side is used.
    pub fn draw<R: Rng + ?Sized>(concerns: &Concerns, belief_count: usize, rng: &mut R) -> Self {
        let conflict = |rng: &mut R| {
            concerns.conflicts.iter().choose(rng).map(|c| {
                MemoryFragment::new(format!("Still circling: {}", c), Emotion::Anxiety, FRAGMENT_STRENGTH)
            })
        };
        let question = |rng: &mut R| {
            concerns.questions.choose(rng).map(|q| {
                MemoryFragment::new(format!("Unanswered: {}", q), Emotion::Reflective, FRAGMENT_STRENGTH)
            })
        };
        let fragment = if rng.gen_bool(0.5) {
            conflict(rng).or_else(|| question(rng))
        } else {
            question(rng).or_else(|| conflict(rng))
        }
        .map(|f| f.with_source(SOURCE));

        let reinforce = (rng.gen_bool(REINFORCE_CHANCE) && belief_count > 0)
            .then(|| rng.gen_range(0..belief_count));
        let request_intuition = rng.gen_bool(INTUITION_CHANCE);

        Self {
            fragment,
            reinforce,
            request_intuition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fragment_tag_follows_source() {
        let mut concerns = Concerns::default();
        concerns.questions.clear();
        concerns.conflicts.insert("order against chaos".to_string());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let plan = SubconsciousPlan::draw(&concerns, 0, &mut rng);
            let f = plan.fragment.unwrap();
            assert_eq!(f.emotion, Emotion::Anxiety);
            assert!((f.strength - FRAGMENT_STRENGTH).abs() < 1e-6);
            assert!(plan.reinforce.is_none());
        }
    }

    #[test]
    fn test_nothing_to_ruminate() {
        let mut concerns = Concerns::default();
        concerns.questions.clear();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(SubconsciousPlan::draw(&concerns, 3, &mut rng).fragment.is_none());
    }

    #[test]
    fn test_draw_rates() {
        let concerns = Concerns::default();
        let mut rng = StdRng::seed_from_u64(7);
        let plans: Vec<_> = (0..1000).map(|_| SubconsciousPlan::draw(&concerns, 4, &mut rng)).collect();
        let reinforced = plans.iter().filter(|p| p.reinforce.is_some()).count();
        let intuitions = plans.iter().filter(|p| p.request_intuition).count();
        assert!(reinforced > 630 && reinforced < 770, "reinforced: {}", reinforced);
        assert!(intuitions > 240 && intuitions < 360, "intuitions: {}", intuitions);
        assert!(plans.iter().all(|p| p.reinforce.map_or(true, |i| i < 4)));
    }
}
