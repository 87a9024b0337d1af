//! Topic selection over the concept graph.

use crate::attention::AttentionStack;
use rand::seq::IteratorRandom;
use rand::Rng;
use reverie_core::text::unique_tokens;
use reverie_core::SubAgent;
use reverie_memory::ConceptGraph;
use std::collections::BTreeSet;

/// Pick the next topic.
///
/// Candidates are the thought's tokens, the attended concepts and the
/// persona's preferred topics. The first graph concept (in enumeration
/// order) that is itself a candidate or has a candidate neighbor wins; the
/// result is a random neighbor of it, or its own name when it has none.
/// Without any match a random concept is returned. `None` only for an
/// empty graph.
pub fn select_topic<R: Rng + ?Sized>(
    thought: &str,
    persona: &SubAgent,
    attention: &AttentionStack,
    graph: &ConceptGraph,
    rng: &mut R,
) -> Option<String> {
    let mut candidates: BTreeSet<String> = unique_tokens(thought).into_iter().collect();
    candidates.extend(attention.concepts().map(str::to_string));
    candidates.extend(persona.preferred_topics.iter().cloned());

    let hit = graph
        .iter()
        .find(|(concept, neighbors)| {
            candidates.contains(*concept) || !neighbors.is_disjoint(&candidates)
        });

    let topic = match hit {
        Some((concept, neighbors)) => neighbors
            .iter()
            .choose(rng)
            .cloned()
            .or_else(|| Some(concept.clone())),
        None => graph.random_concept(rng),
    };
    tracing::debug!("Topic selected: {:?} (persona {})", topic, persona.name);
    topic
}
