//! Configuration for the catalog controller.

use serde::{Deserialize, Serialize};

/// Configuration for the catalog controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Delay before the post-download reconciliation reload, giving the
    /// external tool time to finish trailing file-system writes.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Capacity of the change-event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_event_capacity() -> usize {
    64
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}
