//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this subsystem requires the host to provide.

use async_trait::async_trait;
use shared_types::{ServiceUri, TransportError, Version};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::ReplicatedOperation;

pub use shared_types::PeerResolver;

/// Delivers one encoded operation to one peer.
///
/// Production implementation: `POST {peer}/replication/ops?secret=...` with
/// the version in the `X-SHEETS-version` header. Any 2xx is an ack.
#[async_trait]
pub trait ReplicaTransport: Send + Sync + 'static {
    async fn send_operation(
        &self,
        peer: &ServiceUri,
        encoded: &str,
        version: Version,
        secret: &str,
    ) -> Result<(), TransportError>;
}

/// Applies a decoded operation to local storage on a replica.
pub trait OperationApplier: Send + Sync {
    /// Returns a human-readable reason on failure (e.g. unknown sheet).
    fn apply(&self, operation: &ReplicatedOperation) -> Result<(), String>;
}

impl<T: OperationApplier + ?Sized> OperationApplier for Arc<T> {
    fn apply(&self, operation: &ReplicatedOperation) -> Result<(), String> {
        (**self).apply(operation)
    }
}

/// Anything that can carry response headers.
pub trait VersionStamped {
    fn insert_header(&mut self, name: &str, value: String);
}

impl VersionStamped for BTreeMap<String, String> {
    fn insert_header(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

impl VersionStamped for HashMap<String, String> {
    fn insert_header(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}
