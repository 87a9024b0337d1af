//! Property-based tests for core records: every public mutation keeps the
//! emotion vector normalized and tension inside [0, 1].

use proptest::prelude::*;
use reverie_core::{Emotion, EmotionVector, Tension};

fn arb_emotion() -> impl Strategy<Value = Emotion> {
    (0usize..Emotion::ALL.len()).prop_map(|i| Emotion::ALL[i])
}

proptest! {
    #[test]
    fn nudges_keep_vector_normalized(ops in prop::collection::vec((arb_emotion(), -1.0f32..=1.0), 0..40)) {
        let mut v = EmotionVector::default();
        for (e, d) in ops {
            v.nudge(e, d);
            prop_assert!((v.sum() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn tension_stays_in_unit_interval(start in -5.0f32..=5.0, deltas in prop::collection::vec(-2.0f32..=2.0, 0..30)) {
        let mut t = Tension::new(start);
        prop_assert!((0.0..=1.0).contains(&t.get()));
        for d in deltas {
            t.raise(d);
            prop_assert!((0.0..=1.0).contains(&t.get()));
        }
    }
}
