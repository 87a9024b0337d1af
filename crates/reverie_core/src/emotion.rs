//! Discrete emotion set and the normalized weight vector over it.
//!
//! Unlike a continuous valence/arousal model, the gradient here is a
//! categorical distribution: every weight lies in [0, 1] and the weights
//! sum to 1 after every mutation that goes through this API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The fixed emotion set. Declaration order is the tie-break order for
/// [`EmotionVector::dominant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Curiosity,
    Calm,
    Reflective,
    Anxiety,
    Dreaming,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Curiosity,
        Emotion::Calm,
        Emotion::Reflective,
        Emotion::Anxiety,
        Emotion::Dreaming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Curiosity => "curiosity",
            Emotion::Calm => "calm",
            Emotion::Reflective => "reflective",
            Emotion::Anxiety => "anxiety",
            Emotion::Dreaming => "dreaming",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized weight vector over [`Emotion::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Emotion, f32>", into = "BTreeMap<Emotion, f32>")]
pub struct EmotionVector {
    weights: BTreeMap<Emotion, f32>,
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self::from_pairs(&[
            (Emotion::Curiosity, 0.3),
            (Emotion::Calm, 0.3),
            (Emotion::Reflective, 0.2),
            (Emotion::Anxiety, 0.1),
            (Emotion::Dreaming, 0.1),
        ])
    }
}

impl From<BTreeMap<Emotion, f32>> for EmotionVector {
    fn from(map: BTreeMap<Emotion, f32>) -> Self {
        let pairs: Vec<(Emotion, f32)> = map.into_iter().collect();
        Self::from_pairs(&pairs)
    }
}

impl From<EmotionVector> for BTreeMap<Emotion, f32> {
    fn from(v: EmotionVector) -> Self {
        v.weights
    }
}

impl EmotionVector {
    /// Build from (emotion, weight) pairs. Missing emotions get 0, non-finite
    /// or negative inputs are zeroed, and the result is normalized.
    pub fn from_pairs(pairs: &[(Emotion, f32)]) -> Self {
        let mut weights: BTreeMap<Emotion, f32> = Emotion::ALL.iter().map(|e| (*e, 0.0)).collect();
        for (e, w) in pairs {
            let w = if w.is_finite() { w.max(0.0) } else { 0.0 };
            weights.insert(*e, w);
        }
        let mut v = Self { weights };
        v.normalize();
        v
    }

    pub fn weight(&self, emotion: Emotion) -> f32 {
        self.weights.get(&emotion).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        self.weights.iter().map(|(e, w)| (*e, *w))
    }

    pub fn sum(&self) -> f32 {
        self.weights.values().sum()
    }

    /// Arg-max; ties go to the emotion declared first.
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::ALL[0];
        let mut best_w = f32::MIN;
        for e in Emotion::ALL {
            let w = self.weight(e);
            if w > best_w {
                best = e;
                best_w = w;
            }
        }
        best
    }

    /// Multiply every weight by `factor` without renormalizing.
    pub fn scale(&mut self, factor: f32) {
        for w in self.weights.values_mut() {
            *w *= factor;
        }
    }

    /// Add `delta` to one weight (floored at 0), then renormalize.
    pub fn nudge(&mut self, emotion: Emotion, delta: f32) {
        self.add_raw(emotion, delta);
        self.normalize();
    }

    /// Apply several named adjustments and renormalize once.
    pub fn adjust(&mut self, deltas: &[(Emotion, f32)]) {
        for (e, d) in deltas {
            self.add_raw(*e, *d);
        }
        self.normalize();
    }

    /// Add to one weight without renormalizing. Callers must normalize.
    pub fn add_raw(&mut self, emotion: Emotion, delta: f32) {
        let w = self.weights.entry(emotion).or_insert(0.0);
        *w = (*w + delta).max(0.0);
    }

    /// Rescale so weights sum to 1. A degenerate (all-zero) vector resets to
    /// the uniform distribution.
    pub fn normalize(&mut self) {
        let total = self.sum();
        if !total.is_finite() || total <= f32::EPSILON {
            let uniform = 1.0 / Emotion::ALL.len() as f32;
            for w in self.weights.values_mut() {
                *w = uniform;
            }
            return;
        }
        for w in self.weights.values_mut() {
            *w = (*w / total).clamp(0.0, 1.0);
        }
    }

    /// One-line rendering, highest weight first.
    pub fn describe(&self) -> String {
        let mut pairs: Vec<(Emotion, f32)> = self.iter().collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs
            .iter()
            .map(|(e, w)| format!("{} {:.0}%", e, w * 100.0))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
