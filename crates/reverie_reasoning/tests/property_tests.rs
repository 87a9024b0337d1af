//! Property-based tests for whole cycles.
//!
//! Whatever the seed and however long the run, every bounded store stays
//! inside its bounds.

use proptest::prelude::*;
use reverie_memory::stack::CAPACITY;
use reverie_perception::Perception;
use reverie_reasoning::providers::MockGenerator;
use reverie_reasoning::{Engine, Mind};
use std::sync::Arc;

fn run_cycles(seed: u64, cycles: usize, stimulus: f32) -> Mind {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        let mut engine = Engine::new(
            Mind::default(),
            Arc::new(MockGenerator::new("prop")),
            Perception::new(stimulus, false, None),
            Some(seed),
        );
        for _ in 0..cycles {
            engine.tick().await;
        }
        engine.mind().clone()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn stores_stay_bounded(seed in any::<u64>(), cycles in 1usize..40, stimulus in 0.0f32..1.0) {
        let mind = run_cycles(seed, cycles, stimulus);

        prop_assert!(mind.memory.len() <= CAPACITY);
        for f in mind.memory.iter() {
            prop_assert!((0.1..=1.0).contains(&f.strength), "strength {}", f.strength);
        }

        let attention: Vec<f32> = mind.state.attention.iter().map(|e| e.weight).collect();
        prop_assert!(attention.len() <= 5);
        for w in &attention {
            prop_assert!((0.1..=1.0).contains(w), "attention weight {}", w);
        }
        prop_assert!(attention.windows(2).all(|p| p[0] >= p[1]));

        prop_assert!((mind.emotions.sum() - 1.0).abs() < 1e-4);
        let t = mind.state.tension.get();
        prop_assert!((0.0..=1.0).contains(&t));
        prop_assert!(!mind.state.goals.is_empty());
        prop_assert!(mind.state.stream.len() <= 8);
    }

    #[test]
    fn committed_count_tracks_stack_until_full(seed in any::<u64>(), cycles in 1usize..6) {
        let mind = run_cycles(seed, cycles, 0.0);
        let committed = mind.state.fragments_committed as usize;
        if committed <= CAPACITY {
            prop_assert_eq!(committed, mind.memory.len());
        }
    }
}
