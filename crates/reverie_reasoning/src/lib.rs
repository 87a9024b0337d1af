//! # Reverie Reasoning
//!
//! The cycle engine and everything it needs to ask for text: the
//! generation collaborator, prompt assembly, the cycle decision table and
//! the single-writer scheduler that drives it all on a timer.

pub mod cycle;
pub mod engine;
pub mod llm;
pub mod mind;
pub mod prompts;
pub mod providers;
pub mod scheduler;

pub use cycle::{CycleInputs, CycleKind, CyclePlan, Stage};
pub use engine::{Aside, AsideKind, CycleReport, Engine};
pub use llm::{generate_or_marker, GenerationError, TextGenerator};
pub use mind::{InternalState, Mind, MindSnapshot};
pub use scheduler::{Patch, Scheduler, SchedulerHandle};
