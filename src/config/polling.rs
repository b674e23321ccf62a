// ABOUTME: Stack polling configuration.
// ABOUTME: Fixed interval between status checks and an optional deadline.

use serde::Deserialize;
use std::time::Duration;

use crate::stack::{DEFAULT_POLL_INTERVAL, WaitOptions};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Unset means poll until the stack settles.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: None,
        }
    }
}

fn default_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

impl PollingConfig {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            interval: self.interval,
            timeout: self.timeout,
        }
    }
}
