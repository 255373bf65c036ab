//! gateway::retry
//!
//! Fixed-attempt, constant-delay retry for pull request creation.
//!
//! # Policy
//!
//! A create can race a branch push that the forge has not finished
//! propagating, so its first failures are often transient. The policy is
//! plain: up to `max_attempts` sequential attempts, the same
//! `delay` between each, no growth and no jitter. Attempt N+1 starts only
//! after attempt N's failure is observed and the delay has elapsed. When every
//! attempt fails, the last error is returned as-is.
//!
//! Sleeping goes through the [`Sleeper`] trait so tests can observe or skip
//! the delays.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::forge::ForgeError;

/// Default number of create attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default delay between create attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Suspends the current task without blocking others.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Parameters of the create retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed wait between a failed attempt and the next.
    pub delay: Duration,
    /// Deadline for a single attempt; `None` waits indefinitely.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            attempt_timeout: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempt_timeout: None,
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` until it succeeds or the attempts are used up.
    ///
    /// `op` receives the 1-based attempt number. Errors before the last
    /// attempt are dropped; the last one is returned.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => return Err(err),
                Err(err) => {
                    tracing::debug!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, retrying"
                    );
                    sleeper.sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Apply `attempt_timeout` to a single forge call.
    pub async fn within_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, ForgeError>>,
    ) -> Result<T, ForgeError> {
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ForgeError::Timeout(limit))?,
            None => call.await,
        }
    }
}
