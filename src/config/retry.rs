// ABOUTME: Retry and wait configuration for stack mutations.
// ABOUTME: Fixed-delay bounded retry for delete conflicts and the native waiter bound.

use serde::Deserialize;
use std::time::Duration;

/// Retry policy applied while a delete collides with an in-flight cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,

    /// Total attempts including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_max_attempts() -> u32 {
    60
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            delay: default_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_max_wait", with = "humantime_serde")]
    pub max_wait: Duration,
}

fn default_max_wait() -> Duration {
    crate::cloud::DEFAULT_MAX_WAIT
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            max_wait: default_max_wait(),
        }
    }
}
