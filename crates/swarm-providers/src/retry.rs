//! Retry policy for the async completion path.
//!
//! Each attempt runs under a hard deadline. Failed attempts are followed by a
//! randomized exponential wait: uniform over `[0, min(max_wait, multiplier * 2^(n-1))]`.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use swarm_core::config::schema::RetryConfig;
use tracing::warn;

use crate::error::{LlmError, Result};

/// Bounded retry with jittered exponential backoff and per-attempt deadlines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    multiplier: Duration,
    max_wait: Duration,
    attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.multiplier_ms),
            Duration::from_secs(config.max_wait_secs),
            Duration::from_secs(config.attempt_timeout_secs),
        )
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(
        max_attempts: u32,
        multiplier: Duration,
        max_wait: Duration,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier,
            max_wait,
            attempt_timeout,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Upper bound of the wait after failed attempt `attempt` (1-based).
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.multiplier.saturating_mul(factor).min(self.max_wait)
    }

    /// Randomized wait after failed attempt `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff_ceiling(attempt);
        ceiling.mul_f64(rand::thread_rng().gen::<f64>())
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. `op` receives the 1-based attempt number.
    ///
    /// The last error is returned unchanged in kind.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(self.attempt_timeout, op(attempt)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(LlmError::Timeout(self.attempt_timeout)),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if attempt >= self.max_attempts {
                warn!(attempts = attempt, error = %err, "Giving up after final attempt");
                return Err(err);
            }

            let wait = self.backoff(attempt);
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "Completion attempt failed, retrying"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}
