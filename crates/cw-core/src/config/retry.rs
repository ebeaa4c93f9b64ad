//! Reconnect policy configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;

/// How a failed connection is retried
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts that get an automatic countdown; later failures need a
    /// manual retry
    pub max_retries: u32,

    /// Countdown before an automatic reconnect
    #[serde(with = "duration_secs")]
    pub countdown: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            countdown: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// Countdown length in whole seconds
    pub fn countdown_secs(&self) -> u32 {
        self.countdown.as_secs().min(u32::MAX as u64) as u32
    }
}
