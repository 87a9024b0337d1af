//! # Reverie Perception
//!
//! Where observations from outside the mind come from. Every reading is a
//! plain string; a failed fetch becomes an embedded `[stimulus error]`
//! observation instead of an error.

pub mod environment;
pub mod source;
pub mod stimulus;
pub mod web;

pub use source::{validate_url, Stimulus};
pub use stimulus::{Perception, StimulusKind};
pub use web::WebLookup;
