//! Cycle-local emotion modulators.
//!
//! Each cycle starts from fixed baselines and shifts them additively by the
//! current emotion weights. Cognitive maturity gates the result: a young
//! mind rarely dreams and is slow to change its beliefs.

use reverie_core::{Emotion, EmotionVector};
use serde::{Deserialize, Serialize};

/// Scalar in [0, 1] that grows by a fixed step every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CognitiveMaturity(f32);

impl Default for CognitiveMaturity {
    fn default() -> Self {
        Self(0.1)
    }
}

impl CognitiveMaturity {
    pub const STEP: f32 = 0.005;

    pub fn new(v: f32) -> Self {
        Self(reverie_core::model::sanitize(v, 0.0, 1.0, 0.1))
    }

    pub fn get(&self) -> f32 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = (self.0 + Self::STEP).min(1.0);
    }
}

/// Persistent shifts applied on top of the baselines. Written by
/// self-inspection, bounded to ±[`ModulatorBias::LIMIT`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModulatorBias {
    pub topic_switch: f32,
    pub dream: f32,
}

impl ModulatorBias {
    pub const LIMIT: f32 = 0.2;

    pub fn shift_topic_switch(&mut self, delta: f32) {
        self.topic_switch = (self.topic_switch + delta).clamp(-Self::LIMIT, Self::LIMIT);
    }

    pub fn shift_dream(&mut self, delta: f32) {
        self.dream = (self.dream + delta).clamp(-Self::LIMIT, Self::LIMIT);
    }
}

/// Maturity below which dreaming is suppressed and beliefs harden.
const MATURITY_GATE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionModulators {
    /// Strength multiplier applied to existing memories on insert
    pub memory_decay: f32,
    /// Chance per cycle of a spontaneous topic reselection
    pub topic_switch: f32,
    /// Chance per cycle of entering a dream
    pub dream_chance: f32,
    /// Minimum draw a belief nudge must beat to be applied
    pub belief_threshold: f32,
}

impl Default for EmotionModulators {
    fn default() -> Self {
        Self {
            memory_decay: 0.9,
            topic_switch: 0.15,
            dream_chance: 0.08,
            belief_threshold: 0.1,
        }
    }
}

impl EmotionModulators {
    pub fn compute(emotions: &EmotionVector, maturity: CognitiveMaturity, bias: ModulatorBias) -> Self {
        let base = Self::default();
        let w = |e| emotions.weight(e);

        // Calm slows forgetting, anxiety speeds it up.
        let memory_decay =
            (base.memory_decay + 0.05 * w(Emotion::Calm) - 0.1 * w(Emotion::Anxiety)).clamp(0.7, 0.99);

        let topic_switch = (base.topic_switch
            + 0.3 * w(Emotion::Curiosity)
            + 0.2 * w(Emotion::Anxiety)
            + bias.topic_switch)
            .clamp(0.0, 0.9);

        let mut dream_chance = (base.dream_chance
            + 0.3 * w(Emotion::Dreaming)
            + 0.1 * w(Emotion::Calm)
            + bias.dream)
            .clamp(0.0, 0.6);

        let mut belief_threshold = (base.belief_threshold + 0.2 * w(Emotion::Anxiety)
            - 0.05 * w(Emotion::Curiosity))
            .clamp(0.0, 1.0);

        let m = maturity.get();
        if m < MATURITY_GATE {
            dream_chance *= m / MATURITY_GATE;
            belief_threshold = (belief_threshold + 0.2).min(1.0);
        }

        Self {
            memory_decay,
            topic_switch,
            dream_chance,
            belief_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity_clamps_at_one() {
        let mut m = CognitiveMaturity::new(0.998);
        m.advance();
        m.advance();
        assert_eq!(m.get(), 1.0);
    }

    #[test]
    fn test_low_maturity_suppresses_dreams() {
        let e = EmotionVector::default();
        let young = EmotionModulators::compute(&e, CognitiveMaturity::new(0.0), ModulatorBias::default());
        let old = EmotionModulators::compute(&e, CognitiveMaturity::new(0.9), ModulatorBias::default());
        assert_eq!(young.dream_chance, 0.0);
        assert!(old.dream_chance > 0.0);
        assert!(young.belief_threshold > old.belief_threshold);
    }

    #[test]
    fn test_anxiety_speeds_forgetting_and_switching() {
        let calm = EmotionVector::from_pairs(&[(Emotion::Calm, 1.0)]);
        let anxious = EmotionVector::from_pairs(&[(Emotion::Anxiety, 1.0)]);
        let m = CognitiveMaturity::new(1.0);
        let a = EmotionModulators::compute(&calm, m, ModulatorBias::default());
        let b = EmotionModulators::compute(&anxious, m, ModulatorBias::default());
        assert!(b.memory_decay < a.memory_decay);
        assert!(b.topic_switch > a.topic_switch);
    }

    #[test]
    fn test_bias_is_bounded() {
        let mut bias = ModulatorBias::default();
        for _ in 0..10 {
            bias.shift_topic_switch(0.1);
            bias.shift_dream(-0.1);
        }
        assert_eq!(bias.topic_switch, ModulatorBias::LIMIT);
        assert_eq!(bias.dream, -ModulatorBias::LIMIT);
    }
}
