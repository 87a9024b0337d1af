//! # Reverie Limbic Layer
//!
//! The fast, non-verbal part of the mind. Nothing here talks to the text
//! generator; it only shapes *when* and *with what bias* the slower layers
//! ask for text.
//!
//! - [`gradient`]: per-cycle decay and random excitation of the emotion vector
//! - [`modulators`]: cycle-local probabilities derived from emotion and maturity
//! - [`arbiter`]: choice of the dominant persona for a cycle
//! - [`tension`]: how committed thoughts move mental tension
//! - [`heartbeat`]: tick timing

pub mod arbiter;
pub mod gradient;
mod heartbeat;
pub mod modulators;
pub mod tension;

pub use arbiter::Arbitrator;
pub use gradient::{perturb, PerturbConfig};
pub use heartbeat::TickConfig;
pub use modulators::{CognitiveMaturity, EmotionModulators, ModulatorBias};
