//! # Reverie Expression Layer
//!
//! Everything that decides *what* the mind dwells on, as opposed to how it
//! feels: attention, topic choice, rumination, self-inspection and the
//! bookkeeping of goals, conflicts and questions.

pub mod attention;
pub mod concerns;
pub mod goals;
pub mod metacognition;
pub mod rumination;
pub mod topic;

pub use attention::{AttentionEntry, AttentionStack};
pub use concerns::Concerns;
pub use metacognition::{InspectionOutcome, TriggerPhrases};
pub use rumination::SubconsciousPlan;
pub use topic::select_topic;
