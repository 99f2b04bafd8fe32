//! Retry policy for transient platform failures.
//!
//! A request that fails with a 5xx, a 429, or no response at all is retried
//! with exponential backoff (1s, 2s, ... by default) up to `max_attempts`
//! total attempts. Any other failure is returned immediately. When attempts
//! run out, the last observed error is returned.
//!
//! Backoff sleeps use `tokio::time`, so tests drive them with a paused clock.

use std::future::Future;
use std::time::Duration;

use voxclone_types::config::RetryConfig;
use voxclone_types::error::PlatformError;

/// Explicit retry/backoff policy handed to the platform client.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Growth factor applied to the delay after each further failure.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        self.base_delay.mul_f64(factor)
    }

    /// Whether attempt number `attempt` (1-based) may be followed by another.
    pub fn should_retry(&self, attempt: u32, error: &PlatformError) -> bool {
        error.is_retryable() && attempt < self.max_attempts.max(1)
    }

    /// Run `operation` under this policy.
    ///
    /// `label` identifies the request in logs (e.g. `"GET /tool"`).
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, PlatformError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(attempt, &err) => {
                    let delay = self.delay_after(attempt);
                    tracing::warn!(
                        request = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient platform failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            multiplier: config.multiplier,
        }
    }
}
