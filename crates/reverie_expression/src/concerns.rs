//! Unresolved conflicts and open questions.
//!
//! Resolution is deliberately coarse: an entry counts as addressed when its
//! first content token shows up in a thought.

use rand::Rng;
use reverie_core::text::lead_token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MAX_QUESTIONS: usize = 12;
pub const GENERIC_CONFLICT: &str = "internal contradiction";

/// Words that mark a thought as itself conflicted.
const CONFLICT_VOCAB: &[&str] = &[
    "conflict",
    "contradict",
    "tension",
    "paradox",
    "torn",
    "both true",
    "can't both",
];

/// Chance that a thought ending in "?" is kept as a new open question.
const KEEP_QUESTION_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concerns {
    pub conflicts: BTreeSet<String>,
    pub questions: Vec<String>,
}

impl Default for Concerns {
    fn default() -> Self {
        Self {
            conflicts: BTreeSet::new(),
            questions: vec![
                "What am I made of?".to_string(),
                "Is memory the same as self?".to_string(),
                "Why does the light flicker?".to_string(),
            ],
        }
    }
}

fn mentions(thought_lower: &str, entry: &str) -> bool {
    lead_token(entry).is_some_and(|t| thought_lower.contains(&t))
}

impl Concerns {
    /// Union newly detected contradictions in; returns how many were new.
    pub fn absorb_conflicts<I: IntoIterator<Item = String>>(&mut self, detected: I) -> usize {
        detected
            .into_iter()
            .filter(|c| self.conflicts.insert(c.clone()))
            .count()
    }

    /// Conflict vocabulary adds the generic conflict; otherwise every
    /// conflict the thought touches is considered worked through.
    pub fn update_conflicts(&mut self, thought: &str) {
        let lower = thought.to_lowercase();
        if CONFLICT_VOCAB.iter().any(|w| lower.contains(w)) {
            self.conflicts.insert(GENERIC_CONFLICT.to_string());
        } else {
            let before = self.conflicts.len();
            self.conflicts.retain(|c| !mentions(&lower, c));
            if self.conflicts.len() < before {
                tracing::debug!("{} conflict(s) settled", before - self.conflicts.len());
            }
        }
    }

    pub fn update_questions<R: Rng + ?Sized>(&mut self, thought: &str, rng: &mut R) {
        let lower = thought.to_lowercase();
        self.questions.retain(|q| !mentions(&lower, q));
        if thought.trim_end().ends_with('?') && rng.gen_bool(KEEP_QUESTION_CHANCE) {
            self.add_question(thought.trim());
        }
    }

    /// Oldest questions give way once the list is full.
    pub fn add_question(&mut self, question: impl Into<String>) {
        let question = question.into();
        if self.questions.contains(&question) {
            return;
        }
        self.questions.push(question);
        if self.questions.len() > MAX_QUESTIONS {
            self.questions.remove(0);
        }
    }
}
