//! # Progress Configuration
//!
//! Configuration types for the progress polling loop.
//!
//! The queue-boundary URIs are not part of this configuration. They are a
//! contract with the session and come from [`bridge_traits::is_queue_sentinel`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for the poll period. Anything slower stops looking like a
/// moving progress indicator.
const MAX_POLL_INTERVAL_MS: u64 = 1000;

/// Progress loop configuration.
///
/// Controls how often a snapshot is published while the session is playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Period between two progress ticks, in milliseconds.
    ///
    /// Default: 50 ms.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ProgressConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(format!(
                "poll_interval_ms must be between 1 and {}",
                MAX_POLL_INTERVAL_MS
            ));
        }

        Ok(())
    }

    /// Tick period as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_poll_interval_ms() -> u64 {
    50
}
