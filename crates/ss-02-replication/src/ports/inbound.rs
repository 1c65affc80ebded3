//! # Driving Ports (Inbound API)

use async_trait::async_trait;
use shared_types::{ServiceUri, Version};

use crate::domain::{PropagationStats, ReplicationError};

/// Primary-side operations used by the write path.
#[async_trait]
pub trait ReplicationApi: Send + Sync {
    /// Atomically advance the domain's version.
    fn next_version(&self) -> Version;

    fn current_version(&self) -> Version;

    /// Send an encoded operation to every other instance of the domain and
    /// return once one of them acknowledged, or all of them failed.
    ///
    /// Never fails: a propagation without acknowledgement is reported through
    /// [`PropagationStats::first_ack`] being `None`.
    async fn propagate(
        &self,
        encoded: &str,
        version: Version,
        domain: &str,
        local_uri: &ServiceUri,
        secret: &str,
    ) -> PropagationStats;
}

/// What a replica did with an incoming operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// `applied` operations reached the store (possibly more than the one
    /// received, when it closed a gap). `failed` were rejected by the store.
    Applied {
        applied: usize,
        failed: usize,
        skipped: u64,
    },
    Duplicate,
    Buffered { waiting_for: Version },
}

/// Replica-side intake of operations pushed by the primary.
pub trait ReplicaApi: Send + Sync {
    /// Decode and apply, in version order, an operation sent by the primary.
    fn receive(&self, encoded: &str, version: Version) -> Result<ReceiveOutcome, ReplicationError>;

    /// Forget ordering state, e.g. after the primary changed.
    fn reset(&self);
}
