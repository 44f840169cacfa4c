//! Tick configuration for the session clock
//!
//! One tick is one second of meditation time. The interval only differs from
//! one second in tests and demos.

use std::time::Duration;

/// Configuration for the session clock
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Wall-clock length of one meditation second (default: 1s)
    pub interval: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

impl TickConfig {
    pub fn from_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Very fast clock for testing
    pub fn testing() -> Self {
        Self {
            interval: Duration::from_millis(10),
        }
    }
}
