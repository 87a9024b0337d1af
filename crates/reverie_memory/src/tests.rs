use crate::persist::{self, keys};
use crate::{ConceptGraph, InMemoryStore, MemoryStack, SqliteStore};
use reverie_core::{Emotion, EmotionVector, KvStore, MemoryFragment, Mode};

#[tokio::test]
async fn test_sqlite_get_set_overwrite() {
    let store = SqliteStore::in_memory()
        .await
        .expect("Failed to create store");

    assert_eq!(store.get("topic").await.unwrap(), None);
    store.set("topic", "\"memory\"").await.unwrap();
    store.set("topic", "\"light\"").await.unwrap();
    assert_eq!(store.get("topic").await.unwrap().as_deref(), Some("\"light\""));
}

#[tokio::test]
async fn test_sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mind.db");
    {
        let store = SqliteStore::new(&path).await.unwrap();
        store.set("mode", "\"dream\"").await.unwrap();
    }
    let store = SqliteStore::new(&path).await.unwrap();
    let mode: Mode = persist::load_or_default(&store, keys::MODE).await;
    assert_eq!(mode, Mode::Dream);
}

#[tokio::test]
async fn test_round_trip_through_store() {
    let store = InMemoryStore::new();
    let mut stack = MemoryStack::new();
    stack.push(MemoryFragment::new("a remembered shore", Emotion::Calm, 1.0), 0.9);
    let mut graph = ConceptGraph::new();
    graph.link_fragment("remembered shore");

    persist::save(&store, keys::MEMORY_STACK, &stack).await.unwrap();
    persist::save(&store, keys::CONCEPT_GRAPH, &graph).await.unwrap();

    let stack2: MemoryStack = persist::load_or_default(&store, keys::MEMORY_STACK).await;
    let graph2: ConceptGraph = persist::load_or_default(&store, keys::CONCEPT_GRAPH).await;
    assert_eq!(stack, stack2);
    assert_eq!(graph, graph2);
}

#[tokio::test]
async fn test_malformed_key_falls_back_alone() {
    let store = InMemoryStore::new();
    store.set(keys::EMOTIONAL_GRADIENT, "{not json").await.unwrap();
    store.set(keys::TOPIC, "\"symbol\"").await.unwrap();

    let gradient: EmotionVector = persist::load_or_default(&store, keys::EMOTIONAL_GRADIENT).await;
    let topic: String = persist::load_or(&store, keys::TOPIC, || "memory".to_string()).await;
    assert_eq!(gradient, EmotionVector::default());
    assert_eq!(topic, "symbol");
}

#[tokio::test]
async fn test_missing_key_uses_supplied_default() {
    let store = InMemoryStore::new();
    let graph: ConceptGraph = persist::load_or(&store, keys::CONCEPT_GRAPH, ConceptGraph::seeded).await;
    assert!(graph.contains("memory"));
}
