//! Bounded retry with fixed backoff
//!
//! One [`RetryPolicy`] serves both execution modes: [`RetryPolicy::run`] for
//! blocking source adapters and [`RetryPolicy::run_async`] for work inside the
//! crawl scope. Both consult [`RetryPolicy::next_delay`], so the number of
//! attempts and the delay between them are identical for the two variants.

use crate::config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry parameters for a single external call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`)
    pub max_retries: u32,

    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A policy that makes exactly one attempt
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Decides what happens after attempt number `attempt` (zero-based) failed
    ///
    /// Returns the delay before the next attempt, or `None` once the attempt
    /// budget is spent. Logs the failure either way.
    pub fn next_delay(&self, label: &str, attempt: u32, error: &dyn Display) -> Option<Duration> {
        tracing::warn!("Attempt {} failed for {}: {}", attempt + 1, label, error);
        if attempt < self.max_retries {
            Some(self.backoff)
        } else {
            tracing::error!("All retries failed for {}: {}", label, error);
            None
        }
    }

    /// Runs a blocking operation, sleeping the current thread between attempts
    pub fn run<T, E, F>(&self, label: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        E: Display,
    {
        self.run_with_sleep(label, op, std::thread::sleep)
    }

    pub(crate) fn run_with_sleep<T, E, F, S>(
        &self,
        label: &str,
        mut op: F,
        mut sleep: S,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        S: FnMut(Duration),
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => match self.next_delay(label, attempt, &e) {
                    Some(delay) => {
                        sleep(delay);
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// Runs an asynchronous operation, suspending (not blocking) between attempts
    ///
    /// `op` is called once per attempt to build a fresh future.
    pub async fn run_async<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            let Some(delay) = self.next_delay(label, attempt, &error) else {
                return Err(error);
            };
            drop(error);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
