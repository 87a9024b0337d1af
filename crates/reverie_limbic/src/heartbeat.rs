//! Tick timing for the cognitive scheduler.
//!
//! One tick is one cycle. The dream revert runs on its own one-shot timer,
//! independent of the tick interval.

use std::time::Duration;

/// Timing configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// How often a cycle fires (default: 12s)
    pub interval: Duration,
    /// Delay before dream mode reverts to run mode (default: 8s)
    pub dream_revert: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(12),
            dream_revert: Duration::from_secs(8),
        }
    }
}

impl TickConfig {
    pub fn from_secs(interval_secs: u64, dream_revert_secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs.max(1)),
            dream_revert: Duration::from_secs(dream_revert_secs),
        }
    }
}
