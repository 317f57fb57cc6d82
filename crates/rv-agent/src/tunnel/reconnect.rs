//! Fixed-delay backoff between registration attempts

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use rv_core::config::AgentConfig;

/// Constant delay between attempts: no growth, no jitter, no retry cap
#[derive(Debug, Clone, Copy)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    /// Create a backoff with the given delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Create a backoff from configuration
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.backoff)
    }

    /// Delay before every attempt
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for the delay; returns `false` if cancelled first
    pub async fn sleep(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(self.delay) => true,
        }
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
