pub mod belief;
pub mod concept;
pub mod dream;
pub mod kv;
pub mod persist;
pub mod sqlite;
pub mod stack;

pub use belief::{BeliefGraph, ContradictionDetector};
pub use concept::{ConceptGraph, CooccurrenceTable};
pub use dream::DreamSeed;
pub use kv::InMemoryStore;
pub use sqlite::SqliteStore;
pub use stack::{is_too_similar, MemoryStack};

#[cfg(test)]
mod tests;
