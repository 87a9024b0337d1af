//! How a committed thought moves mental tension.

use reverie_core::{Emotion, Tension};

/// Tension shift for a thought committed under `dominant`. A thought is
/// novel when it passed the similarity gate on its first attempt.
pub fn response(dominant: Emotion, novel: bool) -> f32 {
    match (dominant, novel) {
        (Emotion::Anxiety, false) => 0.1,
        (Emotion::Anxiety, true) => 0.03,
        (Emotion::Calm | Emotion::Reflective, true) => -0.05,
        _ => -0.01,
    }
}

pub fn apply(tension: &mut Tension, dominant: Emotion, novel: bool) {
    tension.raise(response(dominant, novel));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anxious_repetition_raises_most() {
        assert!(response(Emotion::Anxiety, false) > response(Emotion::Anxiety, true));
        assert!(response(Emotion::Calm, true) < 0.0);
        assert!(response(Emotion::Curiosity, true) < 0.0);
    }

    #[test]
    fn test_apply_stays_clamped() {
        let mut t = Tension::new(0.98);
        for _ in 0..5 {
            apply(&mut t, Emotion::Anxiety, false);
        }
        assert_eq!(t.get(), 1.0);
        let mut t = Tension::new(0.02);
        apply(&mut t, Emotion::Reflective, true);
        assert_eq!(t.get(), 0.0);
    }
}
