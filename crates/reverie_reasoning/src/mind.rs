//! The mind's stores, grouped the way they are persisted.

use crate::cycle::CycleKind;
use reverie_core::{
    Belief, DreamEntry, EmotionVector, Environment, Goal, KvStore, Mode, SelfModel,
    SimulatedOther, Tension,
};
use reverie_expression::{goals, AttentionStack, Concerns};
use reverie_limbic::{CognitiveMaturity, ModulatorBias};
use reverie_memory::persist::{self, keys};
use reverie_memory::{BeliefGraph, ConceptGraph, MemoryStack};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const STREAM_LEN: usize = 8;
pub const JOURNAL_LEN: usize = 50;
pub const DEFAULT_TOPIC: &str = "memory";
pub const TOPIC_LOCK: u32 = 3;

/// Everything that is neither a graph nor one of the small scalar stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalState {
    pub beliefs: Vec<Belief>,
    pub concerns: Concerns,
    pub tension: Tension,
    pub goals: Vec<Goal>,
    pub self_model: SelfModel,
    pub attention: AttentionStack,
    pub dream_journal: Vec<DreamEntry>,
    /// Last generated texts, newest last
    pub stream: VecDeque<String>,
    pub bias: ModulatorBias,
    /// Fragments committed over the mind's lifetime. Drives the periodic
    /// subconscious, schema and self-inspection cycles.
    pub fragments_committed: u64,
    /// Name of the persona that dominated the last cycle
    pub dominant: String,
}

impl Default for InternalState {
    fn default() -> Self {
        Self {
            beliefs: vec![
                Belief::new("self", "undefined", 0.5),
                Belief::new("universe", "order", 0.5),
                Belief::new("memory", "fluid", 0.6),
                Belief::new("logic", "true", 0.6),
                Belief::new("existence", "real", 0.5),
            ],
            concerns: Concerns::default(),
            tension: Tension::new(0.2),
            goals: goals::defaults(),
            self_model: SelfModel::default(),
            attention: AttentionStack::new(),
            dream_journal: Vec::new(),
            stream: VecDeque::new(),
            bias: ModulatorBias::default(),
            fragments_committed: 0,
            dominant: String::new(),
        }
    }
}

impl InternalState {
    pub fn push_stream(&mut self, text: &str) {
        self.stream.push_back(text.to_string());
        while self.stream.len() > STREAM_LEN {
            self.stream.pop_front();
        }
    }

    pub fn record_dream(&mut self, entry: DreamEntry) {
        self.dream_journal.push(entry);
        if self.dream_journal.len() > JOURNAL_LEN {
            self.dream_journal.remove(0);
        }
    }

    /// Motifs of the newest `n` dreams, newest first, without repeats.
    pub fn recent_motifs(&self, n: usize) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for entry in self.dream_journal.iter().rev().take(n) {
            for m in &entry.motifs {
                if !out.contains(m) {
                    out.push(m.clone());
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mind {
    pub memory: MemoryStack,
    pub emotions: EmotionVector,
    pub state: InternalState,
    pub concepts: ConceptGraph,
    pub belief_graph: BeliefGraph,
    pub maturity: CognitiveMaturity,
    pub environment: Environment,
    pub other: SimulatedOther,
    pub topic: String,
    pub mode: Mode,
    pub topic_lock: u32,
}

impl Default for Mind {
    fn default() -> Self {
        Self {
            memory: MemoryStack::new(),
            emotions: EmotionVector::default(),
            state: InternalState::default(),
            concepts: ConceptGraph::seeded(),
            belief_graph: BeliefGraph::seeded(),
            maturity: CognitiveMaturity::default(),
            environment: Environment::default(),
            other: SimulatedOther::default(),
            topic: DEFAULT_TOPIC.to_string(),
            mode: Mode::Run,
            topic_lock: TOPIC_LOCK,
        }
    }
}

impl Mind {
    /// Each store loads on its own; anything missing or unreadable falls
    /// back to its default without affecting the others.
    pub async fn load(store: &dyn KvStore) -> Self {
        let mut state: InternalState = persist::load_or_default(store, keys::INTERNAL_STATE).await;
        goals::ensure_nonempty(&mut state.goals);

        let mind = Self {
            memory: persist::load_or_default(store, keys::MEMORY_STACK).await,
            emotions: persist::load_or_default(store, keys::EMOTIONAL_GRADIENT).await,
            state,
            concepts: persist::load_or(store, keys::CONCEPT_GRAPH, ConceptGraph::seeded).await,
            belief_graph: persist::load_or(store, keys::BELIEF_GRAPH, BeliefGraph::seeded).await,
            maturity: persist::load_or_default(store, keys::COGNITIVE_MATURITY).await,
            environment: persist::load_or_default(store, keys::ENVIRONMENT_STATE).await,
            other: persist::load_or_default(store, keys::OTHER_PROFILE).await,
            topic: persist::load_or(store, keys::TOPIC, || DEFAULT_TOPIC.to_string()).await,
            mode: persist::load_or_default(store, keys::MODE).await,
            topic_lock: persist::load_or(store, keys::TOPIC_LOCK, || TOPIC_LOCK).await,
        };
        tracing::info!(
            "Mind loaded: {} memories, {} concepts, maturity {:.3}",
            mind.memory.len(),
            mind.concepts.len(),
            mind.maturity.get()
        );
        mind
    }

    /// Write every store. Stops at the first failing key.
    pub async fn save(&self, store: &dyn KvStore) -> anyhow::Result<()> {
        persist::save(store, keys::MEMORY_STACK, &self.memory).await?;
        persist::save(store, keys::EMOTIONAL_GRADIENT, &self.emotions).await?;
        persist::save(store, keys::INTERNAL_STATE, &self.state).await?;
        persist::save(store, keys::CONCEPT_GRAPH, &self.concepts).await?;
        persist::save(store, keys::BELIEF_GRAPH, &self.belief_graph).await?;
        persist::save(store, keys::COGNITIVE_MATURITY, &self.maturity).await?;
        persist::save(store, keys::ENVIRONMENT_STATE, &self.environment).await?;
        persist::save(store, keys::OTHER_PROFILE, &self.other).await?;
        persist::save(store, keys::TOPIC, &self.topic).await?;
        persist::save(store, keys::MODE, &self.mode).await?;
        persist::save(store, keys::TOPIC_LOCK, &self.topic_lock).await?;
        tracing::debug!("Mind saved");
        Ok(())
    }
}

/// Read-only view handed to renderers after every cycle or patch.
#[derive(Debug, Clone, Serialize)]
pub struct MindSnapshot {
    pub mind: Mind,
    pub pulse: bool,
    pub cycles: u64,
    pub last_cycle: Option<CycleKind>,
    pub last_error: Option<String>,
    pub persona: String,
    pub real_feed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::{Emotion, MemoryFragment};
    use reverie_memory::InMemoryStore;

    #[tokio::test]
    async fn test_empty_store_gives_defaults() {
        let store = InMemoryStore::new();
        let mind = Mind::load(&store).await;
        assert_eq!(mind, Mind::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemoryStore::new();
        let mut mind = Mind::default();
        mind.memory.push(MemoryFragment::new("the lamp hums", Emotion::Calm, 1.0), 0.9);
        mind.topic = "lamp".to_string();
        mind.state.fragments_committed = 41;
        mind.save(&store).await.unwrap();

        assert_eq!(store.keys().await.len(), keys::ALL.len());
        assert_eq!(Mind::load(&store).await, mind);
    }

    #[tokio::test]
    async fn test_one_bad_key_does_not_spoil_the_rest() {
        let store = InMemoryStore::new();
        let mut mind = Mind::default();
        mind.topic = "lamp".to_string();
        mind.save(&store).await.unwrap();
        store.set(keys::INTERNAL_STATE, "[1, 2, 3]").await.unwrap();

        let loaded = Mind::load(&store).await;
        assert_eq!(loaded.topic, "lamp");
        assert_eq!(loaded.state, InternalState::default());
    }

    #[test]
    fn test_stream_bounded() {
        let mut s = InternalState::default();
        for i in 0..20 {
            s.push_stream(&format!("t{}", i));
        }
        assert_eq!(s.stream.len(), STREAM_LEN);
        assert_eq!(s.stream.back().map(String::as_str), Some("t19"));
    }
}
