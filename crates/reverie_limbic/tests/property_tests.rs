//! Property-based tests for the emotional gradient and cycle modulators.
//!
//! Whatever the starting weights, tension or RNG stream, a perturbed
//! gradient sums to 1 and modulators stay inside their documented ranges.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reverie_core::{Emotion, EmotionVector};
use reverie_limbic::{perturb, CognitiveMaturity, EmotionModulators, ModulatorBias};

// ============================================================================
// Strategies
// ============================================================================

fn arb_gradient() -> impl Strategy<Value = EmotionVector> {
    prop::collection::vec(0.0f32..=5.0, Emotion::ALL.len()).prop_map(|ws| {
        let pairs: Vec<(Emotion, f32)> = Emotion::ALL.iter().copied().zip(ws).collect();
        EmotionVector::from_pairs(&pairs)
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn perturb_always_normalizes(
        mut g in arb_gradient(),
        tension in -1.0f32..=2.0,
        seed in any::<u64>(),
        rounds in 1usize..50,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..rounds {
            perturb(&mut g, tension, &mut rng);
            prop_assert!((g.sum() - 1.0).abs() < 1e-4, "sum = {}", g.sum());
            for (_, w) in g.iter() {
                prop_assert!((0.0..=1.0).contains(&w));
            }
        }
    }

    #[test]
    fn modulators_in_range(g in arb_gradient(), maturity in 0.0f32..=1.0, ts in -0.2f32..=0.2, d in -0.2f32..=0.2) {
        let bias = ModulatorBias { topic_switch: ts, dream: d };
        let m = EmotionModulators::compute(&g, CognitiveMaturity::new(maturity), bias);
        prop_assert!(m.memory_decay >= 0.7 && m.memory_decay <= 0.99);
        prop_assert!(m.topic_switch >= 0.0 && m.topic_switch <= 0.9);
        prop_assert!(m.dream_chance >= 0.0 && m.dream_chance <= 0.6);
        prop_assert!(m.belief_threshold >= 0.0 && m.belief_threshold <= 1.0);
    }
}
