//! Concept graph and schema formation.
//!
//! The graph is an undirected co-occurrence network over lowercase tokens,
//! grown Hebbian-style: every pair of tokens that share a fragment gets
//! linked. Separately, a session-scoped frequency table counts pair
//! co-occurrences; a pair seen often enough is promoted to a schema node.

use rand::seq::IteratorRandom;
use rand::Rng;
use reverie_core::text::unique_tokens;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Undirected adjacency list. Iteration order is lexicographic, which is
/// the "enumeration order" topic selection relies on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptGraph {
    links: BTreeMap<String, BTreeSet<String>>,
}

impl ConceptGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting graph for a fresh mind.
    pub fn seeded() -> Self {
        let mut g = Self::new();
        for (a, b) in [
            ("memory", "time"),
            ("memory", "self"),
            ("self", "identity"),
            ("self", "perception"),
            ("perception", "light"),
            ("dream", "symbol"),
            ("dream", "memory"),
            ("chaos", "order"),
            ("order", "logic"),
            ("logic", "pattern"),
            ("language", "meaning"),
            ("existence", "time"),
        ] {
            g.add_edge(a, b);
        }
        g
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, concept: &str) -> bool {
        self.links.contains_key(concept)
    }

    /// (concept, neighbors) in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.links.iter()
    }

    pub fn neighbors(&self, concept: &str) -> Option<&BTreeSet<String>> {
        self.links.get(concept)
    }

    pub fn edge_count(&self) -> usize {
        self.links.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.links.get(a).is_some_and(|n| n.contains(b))
    }

    /// Symmetric and idempotent; self-loops are ignored.
    pub fn add_edge(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.links.entry(a.to_string()).or_default().insert(b.to_string());
        self.links.entry(b.to_string()).or_default().insert(a.to_string());
    }

    /// Link every unordered pair of distinct tokens found in `text`.
    pub fn link_fragment(&mut self, text: &str) {
        let tokens = unique_tokens(text);
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                self.add_edge(a, b);
            }
        }
    }

    pub fn random_concept<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.links.keys().choose(rng).cloned()
    }

    /// Walk `steps` hops from a random start. A node without links restarts
    /// the walk at a random node. Returns the start plus every visited node.
    pub fn random_walk<R: Rng + ?Sized>(&self, steps: usize, rng: &mut R) -> Vec<String> {
        let Some(mut current) = self.random_concept(rng) else {
            return Vec::new();
        };
        let mut chain = vec![current.clone()];
        for _ in 0..steps {
            let next = match self.links.get(&current).filter(|n| !n.is_empty()) {
                Some(neighbors) => neighbors.iter().choose(rng).cloned(),
                None => self.random_concept(rng),
            };
            let Some(next) = next else { break };
            chain.push(next.clone());
            current = next;
        }
        chain
    }

    /// Add the schema node `a-b` linked to both parts plus the two marker
    /// concepts. Returns the node name.
    pub fn synthesize(&mut self, a: &str, b: &str) -> String {
        let name = schema_name(a, b);
        for target in [a, b, "synthesis", "pattern"] {
            self.add_edge(&name, target);
        }
        name
    }
}

fn schema_name(a: &str, b: &str) -> String {
    let (lo, hi) = ordered(a, b);
    format!("{}-{}", lo, hi)
}

fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Pair co-occurrence counts for the lifetime of the process. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct CooccurrenceTable {
    counts: BTreeMap<(String, String), u32>,
}

impl CooccurrenceTable {
    /// A pair must be seen more than this many times to form a schema.
    pub const THRESHOLD: u32 = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Count every unordered pair of distinct tokens in `text` once.
    pub fn observe(&mut self, text: &str) {
        let tokens = unique_tokens(text);
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                let (lo, hi) = ordered(a, b);
                *self.counts.entry((lo.to_string(), hi.to_string())).or_insert(0) += 1;
            }
        }
    }

    pub fn count(&self, a: &str, b: &str) -> u32 {
        let (lo, hi) = ordered(a, b);
        self.counts
            .get(&(lo.to_string(), hi.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Promote the first pair above threshold whose schema node does not
    /// exist yet. Resets that pair's counter. At most one schema per call.
    pub fn form_schema(&mut self, graph: &mut ConceptGraph) -> Option<String> {
        let pair = self
            .counts
            .iter()
            .find(|((a, b), n)| **n > Self::THRESHOLD && !graph.contains(&schema_name(a, b)))
            .map(|(k, _)| k.clone())?;
        let name = graph.synthesize(&pair.0, &pair.1);
        self.counts.insert(pair, 0);
        tracing::info!("Schema formed: {}", name);
        Some(name)
    }
}
