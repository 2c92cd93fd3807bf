//! Bounded retry with a fixed delay

use crate::config::HostedConfig;
use crate::{MirrorError, Result};
use std::future::Future;
use std::time::Duration;

/// Fixed-delay retry policy for hosted API calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1)
    pub max_attempts: u32,

    /// Pause between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &HostedConfig) -> Self {
        Self::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Runs `op` until it succeeds or the attempt budget is spent
    ///
    /// # Arguments
    ///
    /// * `label` - What is being attempted, for the log
    /// * `op` - Produces a fresh attempt each time it is called
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The first successful result
    /// * `Err(MirrorError::RetriesExhausted)` - Every attempt failed
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!("{} failed (attempt {}/{}): {}", label, attempt, attempts, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }

        Err(MirrorError::RetriesExhausted {
            attempts,
            last_error,
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HostedConfig::default())
    }
}
