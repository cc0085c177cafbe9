//! Caller-side retry policy for transient planning failures.
//!
//! The planner never retries on its own; callers wrap a planning run with a
//! `RetryPolicy` and re-run it against fresh availability.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed,
    /// Exponential backoff: base * 2^(attempt-1)
    #[default]
    Exponential,
    /// Linear backoff: base * attempt
    Linear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first run (0 = run once).
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Cap applied to every computed delay.
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            strategy: BackoffStrategy::Exponential,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    pub fn linear(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Linear,
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
        }
    }

    /// Delay before retry number `attempt` (1-indexed; 0 means the first run).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.base_delay.saturating_mul(factor)
            }
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
        };
        delay.min(self.max_delay)
    }

    /// Check if more retries are allowed after `retries` retries.
    pub fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_attempts
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. `op` receives the 0-indexed attempt number.
    pub fn run<T, E>(
        &self,
        mut op: impl FnMut(u32) -> Result<T, E>,
        is_retryable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
    {
        let mut attempt = 0u32;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && self.should_retry(attempt) => {
                    attempt += 1;
                    let delay = self.delay_for_attempt(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
                Err(e) => {
                    debug!(attempt, error = %e, "giving up");
                    return Err(e);
                }
            }
        }
    }
}
