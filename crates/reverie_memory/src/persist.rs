//! Per-key load/save of the mind's stores.
//!
//! Every store lives under its own key as JSON. Loading is forgiving: a
//! missing, unreadable or malformed value yields the default for that key
//! alone and never aborts startup.

use reverie_core::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod keys {
    pub const MEMORY_STACK: &str = "memory_stack";
    pub const EMOTIONAL_GRADIENT: &str = "emotional_gradient";
    pub const INTERNAL_STATE: &str = "internal_state";
    pub const CONCEPT_GRAPH: &str = "concept_graph";
    pub const BELIEF_GRAPH: &str = "belief_graph";
    pub const COGNITIVE_MATURITY: &str = "cognitive_maturity";
    pub const ENVIRONMENT_STATE: &str = "environment_state";
    pub const OTHER_PROFILE: &str = "other_profile";
    pub const TOPIC: &str = "topic";
    pub const MODE: &str = "mode";
    pub const TOPIC_LOCK: &str = "topic_lock";

    pub const ALL: [&str; 11] = [
        MEMORY_STACK,
        EMOTIONAL_GRADIENT,
        INTERNAL_STATE,
        CONCEPT_GRAPH,
        BELIEF_GRAPH,
        COGNITIVE_MATURITY,
        ENVIRONMENT_STATE,
        OTHER_PROFILE,
        TOPIC,
        MODE,
        TOPIC_LOCK,
    ];
}

/// Load `key`, falling back to `default()` on any failure.
pub async fn load_or<T, F>(store: &dyn KvStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Malformed value under {}, using default: {}", key, e);
                default()
            }
        },
        Ok(None) => default(),
        Err(e) => {
            tracing::warn!("Failed to read {}, using default: {:#}", key, e);
            default()
        }
    }
}

pub async fn load_or_default<T>(store: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    load_or(store, key, T::default).await
}

pub async fn save<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json).await
}
