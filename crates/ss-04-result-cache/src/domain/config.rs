use serde::{Deserialize, Serialize};
use shared_types::{RetryPolicy, SHEETS_SERVICE};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Service serving ranges in the remote domain.
    pub service_name: String,
    /// Attempts per peer, including the first.
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Deadline of a single fetch attempt.
    pub request_timeout_ms: u64,
    /// Entries not written for this long are evicted by the sweeper.
    /// `None` keeps entries for the life of the process.
    pub max_entry_age_ms: Option<u64>,
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            service_name: SHEETS_SERVICE.to_string(),
            max_attempts: 3,
            retry_backoff_ms: 100,
            request_timeout_ms: 2_000,
            max_entry_age_ms: None,
            sweep_interval_ms: 60_000,
        }
    }
}

impl CacheConfig {
    pub fn for_testing() -> Self {
        Self {
            max_attempts: 2,
            retry_backoff_ms: 5,
            request_timeout_ms: 50,
            ..Self::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
            attempt_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }
}
