//! # Reverie Core
//!
//! Shared vocabulary for the cognitive-state simulation: the emotion set,
//! the records every store is built from, tokenization, configuration and
//! the persistence seam.

pub mod config;
pub mod emotion;
pub mod model;
pub mod text;

pub use config::ReverieConfig;
pub use emotion::{Emotion, EmotionVector};
pub use model::{
    Belief, DreamEntry, Environment, Goal, IdentityEntry, MemoryFragment, Mode, SelfModel,
    SimulatedOther, SubAgent, Tension,
};

use async_trait::async_trait;

/// Opaque key-value persistence. Each top-level store is written under its
/// own key as a serialized string; a missing key means "use the default".
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}
