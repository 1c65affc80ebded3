use serde::{Deserialize, Serialize};
use shared_types::{RetryPolicy, ServiceUri, Version, SHEETS_SERVICE};
use std::time::Duration;

/// Replication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Service whose instances receive operations (`"<domain>:<service_name>"`).
    pub service_name: String,
    /// Attempts per peer, including the first.
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    /// Deadline of a single send attempt.
    pub request_timeout_ms: u64,
    /// Operations a replica holds back while waiting for a missing version.
    pub reorder_capacity: usize,
    /// Seed of the version counter; the first issued version is `seed + 1`.
    pub initial_version: u64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            service_name: SHEETS_SERVICE.to_string(),
            max_attempts: 3,
            retry_backoff_ms: 100,
            request_timeout_ms: 2_000,
            reorder_capacity: 64,
            initial_version: 0,
        }
    }
}

impl ReplicationConfig {
    /// Fast timings for tests.
    pub fn for_testing() -> Self {
        Self {
            max_attempts: 2,
            retry_backoff_ms: 5,
            request_timeout_ms: 50,
            reorder_capacity: 8,
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

    pub fn initial_version(&self) -> Version {
        Version(self.initial_version)
    }
}

/// Result of one `propagate` call, as known when it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationStats {
    pub version: Version,
    pub peers_targeted: usize,
    /// First peer to acknowledge; `None` if nobody did (or no peers).
    pub first_ack: Option<ServiceUri>,
    /// Sends that had already failed when the call returned.
    pub failures: usize,
}

impl PropagationStats {
    pub fn acknowledged(&self) -> bool {
        self.first_ack.is_some()
    }
}

/// Point-in-time copy of the coordinator counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorMetrics {
    pub current_version: u64,
    pub operations_propagated: u64,
    pub acks_received: u64,
    pub propagations_without_ack: u64,
    pub send_failures: u64,
}

/// Point-in-time copy of the replica applier counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplicaMetrics {
    pub applied: u64,
    pub duplicates: u64,
    pub buffered: u64,
    pub skipped_versions: u64,
    pub rejected: u64,
    pub last_applied: Option<u64>,
}
