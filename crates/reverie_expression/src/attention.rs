//! Attention stack: the handful of concepts currently in focus.
//!
//! Every cycle all weights decay, concepts mentioned again are reinforced,
//! new ones enter at full weight, and anything that has faded below the
//! floor drops out. Only the five heaviest survive.

use serde::{Deserialize, Serialize};

pub const CAPACITY: usize = 5;
pub const DECAY: f32 = 0.9;
pub const REINFORCE: f32 = 0.2;
pub const FLOOR: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionEntry {
    pub concept: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<AttentionEntry>", into = "Vec<AttentionEntry>")]
pub struct AttentionStack {
    entries: Vec<AttentionEntry>,
}

impl From<Vec<AttentionEntry>> for AttentionStack {
    fn from(entries: Vec<AttentionEntry>) -> Self {
        let mut stack = Self {
            entries: entries
                .into_iter()
                .filter(|e| e.weight.is_finite())
                .map(|e| AttentionEntry {
                    weight: e.weight.min(1.0),
                    ..e
                })
                .collect(),
        };
        stack.settle();
        stack
    }
}

impl From<AttentionStack> for Vec<AttentionEntry> {
    fn from(stack: AttentionStack) -> Self {
        stack.entries
    }
}

impl AttentionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Heaviest first.
    pub fn iter(&self) -> impl Iterator<Item = &AttentionEntry> {
        self.entries.iter()
    }

    pub fn concepts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.concept.as_str())
    }

    pub fn weight(&self, concept: &str) -> Option<f32> {
        self.entries.iter().find(|e| e.concept == concept).map(|e| e.weight)
    }

    /// The heaviest concept.
    pub fn focus(&self) -> Option<&str> {
        self.entries.first().map(|e| e.concept.as_str())
    }

    /// One cycle of attention: decay, then reinforce or insert each of
    /// `mentioned`, then prune, sort and truncate.
    pub fn update<I, S>(&mut self, mentioned: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for e in self.entries.iter_mut() {
            e.weight *= DECAY;
        }
        for concept in mentioned {
            let concept = concept.as_ref();
            match self.entries.iter_mut().find(|e| e.concept == concept) {
                Some(e) => e.weight = (e.weight + REINFORCE).min(1.0),
                None => self.entries.push(AttentionEntry {
                    concept: concept.to_string(),
                    weight: 1.0,
                }),
            }
        }
        self.settle();
    }

    /// A cycle in which nothing was attended to: decay and prune only.
    pub fn decay(&mut self) {
        self.update(std::iter::empty::<&str>());
    }

    fn settle(&mut self) {
        self.entries.retain(|e| e.weight >= FLOOR);
        self.entries.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        self.entries.truncate(CAPACITY);
    }

    pub fn describe(&self) -> String {
        if self.entries.is_empty() {
            return "nothing in particular".to_string();
        }
        self.entries
            .iter()
            .map(|e| format!("{} ({:.2})", e.concept, e.weight))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
