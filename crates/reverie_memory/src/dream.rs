//! Dream seeds.
//!
//! A dream is woven from a few randomly recalled fragments and a short
//! free-association chain walked through the concept graph. This module
//! only gathers the material; wording is left to the text generator.

use crate::concept::ConceptGraph;
use crate::stack::MemoryStack;
use rand::seq::IteratorRandom;
use rand::Rng;
use reverie_core::text::content_tokens;
use reverie_core::MemoryFragment;
use std::collections::BTreeMap;

pub const SAMPLE_SIZE: usize = 3;
pub const WALK_STEPS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct DreamSeed {
    /// Up to three fragments, drawn without replacement
    pub memories: Vec<MemoryFragment>,
    /// Start node plus one node per walk step
    pub chain: Vec<String>,
}

impl DreamSeed {
    pub fn gather<R: Rng + ?Sized>(stack: &MemoryStack, graph: &ConceptGraph, rng: &mut R) -> Self {
        let memories = stack.iter().cloned().choose_multiple(rng, SAMPLE_SIZE);
        let chain = graph.random_walk(WALK_STEPS, rng);
        Self { memories, chain }
    }

    pub fn chain_text(&self) -> String {
        self.chain.join(" → ")
    }
}

/// The `n` most frequent content tokens of `text`; ties keep first appearance.
pub fn motifs(text: &str, n: usize) -> Vec<String> {
    let tokens = content_tokens(text);
    let lower = text.to_lowercase();
    let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
    for t in &tokens {
        freq.insert(t.as_str(), lower.matches(t.as_str()).count());
    }
    let mut ranked: Vec<&String> = tokens.iter().collect();
    ranked.sort_by(|a, b| freq[b.as_str()].cmp(&freq[a.as_str()]));
    ranked.into_iter().take(n).cloned().collect()
}
