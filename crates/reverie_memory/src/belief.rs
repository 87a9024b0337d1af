//! Belief graph and contradiction detection.
//!
//! The belief graph is an associative map between concepts, separate from
//! the concept graph, used only to find implied contradictions between
//! linked beliefs.

use reverie_core::text::unique_tokens;
use reverie_core::Belief;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefGraph {
    links: BTreeMap<String, BTreeSet<String>>,
}

impl BeliefGraph {
    pub fn seeded() -> Self {
        let mut g = Self::default();
        g.link("logic", "chaos");
        g.link("self", "memory");
        g.link("existence", "self");
        g
    }

    pub fn link(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.links.entry(a.to_string()).or_default().insert(b.to_string());
        self.links.entry(b.to_string()).or_default().insert(a.to_string());
    }

    pub fn linked(&self, a: &str, b: &str) -> bool {
        self.links.get(a).is_some_and(|n| n.contains(b))
    }

    pub fn link_fragment(&mut self, text: &str) {
        let tokens = unique_tokens(text);
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                self.link(a, b);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// A concept whose stance may not hold both labels at once.
#[derive(Debug, Clone)]
pub struct StanceRule {
    pub concept: String,
    pub first: String,
    pub second: String,
}

impl StanceRule {
    fn new(concept: &str, first: &str, second: &str) -> Self {
        Self {
            concept: concept.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

pub struct ContradictionDetector {
    rules: Vec<StanceRule>,
    /// Linked concept pairs that cannot both be "true".
    exclusive_pairs: Vec<(String, String)>,
}

impl Default for ContradictionDetector {
    fn default() -> Self {
        Self {
            rules: vec![
                StanceRule::new("self", "undefined", "defined"),
                StanceRule::new("universe", "chaos", "order"),
                StanceRule::new("will", "free", "determined"),
                StanceRule::new("memory", "fluid", "static"),
                StanceRule::new("existence", "real", "simulated"),
            ],
            exclusive_pairs: vec![
                ("logic".to_string(), "chaos".to_string()),
                ("certainty".to_string(), "doubt".to_string()),
            ],
        }
    }
}

impl ContradictionDetector {
    /// Human-readable descriptions of every contradiction currently present.
    pub fn detect(&self, beliefs: &[Belief], graph: &BeliefGraph) -> BTreeSet<String> {
        let stance_of = |concept: &str| {
            beliefs
                .iter()
                .find(|b| b.concept == concept)
                .map(|b| b.stance.to_lowercase())
        };
        let mut found = BTreeSet::new();

        for rule in &self.rules {
            if let Some(stance) = stance_of(rule.concept.as_str()) {
                if stance.contains(&rule.first) && stance.contains(&rule.second) {
                    found.insert(format!(
                        "{}: both {} and {}",
                        rule.concept, rule.first, rule.second
                    ));
                }
            }
        }

        for (a, b) in &self.exclusive_pairs {
            if !graph.linked(a, b) {
                continue;
            }
            let holds = |c: &str| stance_of(c).is_some_and(|s| s.trim() == "true");
            if holds(a.as_str()) && holds(b.as_str()) {
                found.insert(format!("{} and {} are both held true (implied contradiction)", a, b));
            }
        }

        if !found.is_empty() {
            tracing::debug!("Contradictions detected: {:?}", found);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stance_rule_fires_on_both_labels() {
        let beliefs = vec![Belief::new("self", "undefined and defined", 0.5)];
        let found = ContradictionDetector::default().detect(&beliefs, &BeliefGraph::default());
        assert_eq!(found.len(), 1);
        assert!(found.iter().next().unwrap().contains("self"));
    }

    #[test]
    fn test_stance_conflict_leads_with_concept() {
        let beliefs = vec![Belief::new("self", "undefined", 0.5)];
        let found = ContradictionDetector::default().detect(&beliefs, &BeliefGraph::default());
        let entry = found.iter().next().unwrap();
        assert_eq!(entry, "self: both undefined and defined");
        assert_eq!(reverie_core::text::lead_token(entry).as_deref(), Some("self"));
    }

    #[test]
    fn test_stance_rule_needs_both_labels() {
        let beliefs = vec![Belief::new("memory", "fluid", 0.5)];
        let found = ContradictionDetector::default().detect(&beliefs, &BeliefGraph::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_implied_contradiction_requires_link() {
        let beliefs = vec![Belief::new("logic", "true", 0.8), Belief::new("chaos", "true", 0.6)];
        let detector = ContradictionDetector::default();

        assert!(detector.detect(&beliefs, &BeliefGraph::default()).is_empty());

        let mut graph = BeliefGraph::default();
        graph.link("logic", "chaos");
        let found = detector.detect(&beliefs, &graph);
        assert!(found.iter().any(|c| c.starts_with("logic and chaos") && c.contains("implied")));
    }

    #[test]
    fn test_results_deduplicated() {
        let beliefs = vec![
            Belief::new("existence", "real but simulated", 0.5),
            Belief::new("existence", "real yet simulated", 0.5),
        ];
        let found = ContradictionDetector::default().detect(&beliefs, &BeliefGraph::default());
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_link_fragment_symmetric() {
        let mut g = BeliefGraph::default();
        g.link_fragment("order needs chaos");
        assert!(g.linked("chaos", "order"));
        assert!(g.linked("needs", "order"));
    }
}
