//! Plain data records shared by every subsystem.

use crate::emotion::Emotion;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Replace NaN/Inf with `fallback` and clamp into [lo, hi].
#[inline]
pub fn sanitize(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(lo, hi)
    } else {
        tracing::warn!("Non-finite value in state, resetting to {}", fallback);
        fallback
    }
}

/// Serde helper: read an f32 and force it into [0, 1].
pub fn deserialize_unit_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f32::deserialize(deserializer)?;
    Ok(sanitize(v, 0.0, 1.0, 0.5))
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

// =============================================================================
// Memory
// =============================================================================

pub const MIN_STRENGTH: f32 = 0.1;
pub const MAX_STRENGTH: f32 = 1.0;

/// A remembered fragment of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFragment {
    pub text: String,
    pub emotion: Emotion,
    pub strength: f32,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl MemoryFragment {
    pub fn new(text: impl Into<String>, emotion: Emotion, strength: f32) -> Self {
        Self {
            text: text.into(),
            emotion,
            strength: sanitize(strength, MIN_STRENGTH, MAX_STRENGTH, MAX_STRENGTH),
            timestamp: now_ts(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// =============================================================================
// Beliefs, goals, tension
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    pub concept: String,
    pub stance: String,
    #[serde(deserialize_with = "deserialize_unit_f32")]
    pub confidence: f32,
    #[serde(default)]
    pub evidence: Vec<String>,
}

impl Belief {
    pub fn new(concept: &str, stance: &str, confidence: f32) -> Self {
        Self {
            concept: concept.to_string(),
            stance: stance.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            evidence: Vec::new(),
        }
    }

    pub fn adjust_confidence(&mut self, delta: f32) {
        self.confidence = sanitize(self.confidence + delta, 0.0, 1.0, 0.5);
    }
}

pub const MIN_URGENCY: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
    pub urgency: f32,
}

impl Goal {
    pub fn new(description: &str, urgency: f32) -> Self {
        Self {
            description: description.to_string(),
            urgency: urgency.clamp(MIN_URGENCY, 1.0),
        }
    }

    pub fn adjust_urgency(&mut self, delta: f32) {
        self.urgency = sanitize(self.urgency + delta, MIN_URGENCY, 1.0, 0.5);
    }
}

/// Scalar measure of unresolved internal conflict, always in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tension(f32);

impl<'de> Deserialize<'de> for Tension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::new(f32::deserialize(deserializer)?))
    }
}

impl Tension {
    pub fn new(v: f32) -> Self {
        Self(sanitize(v, 0.0, 1.0, 0.0))
    }

    pub fn get(&self) -> f32 {
        self.0
    }

    pub fn raise(&mut self, by: f32) {
        self.0 = sanitize(self.0 + by, 0.0, 1.0, 0.0);
    }

    pub fn lower(&mut self, by: f32) {
        self.raise(-by);
    }
}

// =============================================================================
// Personas
// =============================================================================

/// A named bias profile that colors one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgent {
    pub name: String,
    pub bias: String,
    pub emotion_profile: BTreeMap<Emotion, f32>,
    /// Added to belief confidence nudges while this persona dominates.
    pub belief_bias: f32,
    pub preferred_topics: Vec<String>,
}

impl SubAgent {
    fn build(
        name: &str,
        bias: &str,
        profile: &[(Emotion, f32)],
        belief_bias: f32,
        topics: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            bias: bias.to_string(),
            emotion_profile: profile.iter().copied().collect(),
            belief_bias,
            preferred_topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn logician() -> Self {
        Self::build(
            "Logician",
            "Seeks order, structure and proof. Speaks in measured, precise steps.",
            &[(Emotion::Calm, 0.6), (Emotion::Curiosity, 0.4)],
            0.05,
            &["logic", "order", "pattern", "structure"],
        )
    }

    pub fn doubter() -> Self {
        Self::build(
            "Doubter",
            "Suspects every certainty. Fearful, hesitant, questions its own footing.",
            &[(Emotion::Anxiety, 0.7), (Emotion::Reflective, 0.3)],
            -0.05,
            &["self", "existence", "doubt", "memory"],
        )
    }

    pub fn dreamer() -> Self {
        Self::build(
            "Dreamer",
            "Thinks in symbols and images. Trusts intuition over argument.",
            &[(Emotion::Dreaming, 0.6), (Emotion::Curiosity, 0.4)],
            0.02,
            &["dream", "symbol", "time", "light"],
        )
    }

    pub fn wanderer() -> Self {
        Self::build(
            "Wanderer",
            "Drifts between topics, easily distracted by whatever is new.",
            &[(Emotion::Curiosity, 0.7), (Emotion::Calm, 0.3)],
            0.0,
            &["perception", "language", "world", "change"],
        )
    }

    /// The default roster. Arbitration refers to the first three by role.
    pub fn roster() -> Vec<SubAgent> {
        vec![
            Self::logician(),
            Self::doubter(),
            Self::dreamer(),
            Self::wanderer(),
        ]
    }
}

// =============================================================================
// Self-model and dream journal
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityEntry {
    pub timestamp: i64,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfModel {
    pub identity: String,
    pub recent_changes: Vec<String>,
    pub last_emotion: Emotion,
    pub last_conflict: Option<String>,
    pub loop_detected: bool,
    pub narrative: Vec<IdentityEntry>,
}

impl Default for SelfModel {
    fn default() -> Self {
        Self {
            identity: "an unfinished mind".to_string(),
            recent_changes: Vec::new(),
            last_emotion: Emotion::Curiosity,
            last_conflict: None,
            loop_detected: false,
            narrative: Vec::new(),
        }
    }
}

impl SelfModel {
    pub const MAX_CHANGES: usize = 10;
    pub const MAX_NARRATIVE: usize = 50;

    pub fn record_change(&mut self, change: impl Into<String>) {
        self.recent_changes.push(change.into());
        if self.recent_changes.len() > Self::MAX_CHANGES {
            self.recent_changes.remove(0);
        }
    }

    pub fn record_insight(&mut self, insight: impl Into<String>) {
        self.narrative.push(IdentityEntry {
            timestamp: now_ts(),
            insight: insight.into(),
        });
        if self.narrative.len() > Self::MAX_NARRATIVE {
            self.narrative.remove(0);
        }
    }

    /// Short rendering for prompt context.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("I am {}", self.identity)];
        parts.push(format!("last felt {}", self.last_emotion));
        if let Some(c) = &self.last_conflict {
            parts.push(format!("last conflict: {}", c));
        }
        if self.loop_detected {
            parts.push("I noticed I was looping".to_string());
        }
        if let Some(last) = self.narrative.last() {
            parts.push(format!("latest insight: {}", last.insight));
        }
        parts.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamEntry {
    pub timestamp: i64,
    pub fragment: String,
    pub motifs: Vec<String>,
}

// =============================================================================
// Environment and simulated other
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub noise: String,
    pub light: String,
    pub temperature_c: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            noise: "a low electrical hum".to_string(),
            light: "dim".to_string(),
            temperature_c: 21.0,
        }
    }
}

impl Environment {
    pub fn describe(&self) -> String {
        format!(
            "noise: {}, light: {}, temperature: {:.1}°C",
            self.noise, self.light, self.temperature_c
        )
    }
}

/// Profile of the imagined interlocutor whose voice occasionally intrudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedOther {
    pub name: String,
    pub traits: Vec<String>,
    pub last_words: Option<String>,
}

impl Default for SimulatedOther {
    fn default() -> Self {
        Self {
            name: "the Observer".to_string(),
            traits: vec!["patient".to_string(), "skeptical".to_string()],
            last_words: None,
        }
    }
}

/// Engine run mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Run,
    Dream,
}
