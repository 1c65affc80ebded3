//! Bounded retry of outbound peer calls.
//!
//! Every attempt runs under its own deadline. Transient failures (see
//! [`TransportError::is_transient`]) are retried after a fixed backoff until
//! the attempt budget is spent; anything else fails immediately.

use std::future::Future;
use std::time::Duration;

use crate::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub backoff: Duration,
    /// Deadline for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(100),
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once with the given deadline.
    pub fn once(attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            attempt_timeout,
        }
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out.
    ///
    /// `call` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, TransportError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let error = match tokio::time::timeout(self.attempt_timeout, call(attempt)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => TransportError::Timeout,
            };

            if attempt >= attempts || !error.is_transient() {
                return Err(error);
            }
            tracing::debug!(attempt, error = %error, "Transient peer failure, retrying");
            attempt += 1;
            tokio::time::sleep(self.backoff).await;
        }
    }
}
