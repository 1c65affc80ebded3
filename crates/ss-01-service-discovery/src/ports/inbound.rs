//! # Driving Ports (Inbound API)

use shared_types::ServiceUri;

use crate::domain::{DirectoryStats, DiscoveryError, ObserveOutcome};

/// Query side of discovery used by the rest of the node.
pub trait DiscoveryApi: Send + Sync {
    /// Snapshot of the fresh endpoints known for a qualified service name.
    ///
    /// Empty when nothing is known; never an error.
    fn resolve(&self, service_name: &str) -> Vec<ServiceUri>;

    /// Parse one raw datagram and record it in the directory.
    fn handle_datagram(&self, bytes: &[u8]) -> Result<ObserveOutcome, DiscoveryError>;

    /// Drop entries that stopped announcing. Returns how many were removed.
    fn evict_stale(&self) -> usize;

    /// Qualified service names currently known.
    fn known_services(&self) -> Vec<String>;

    fn directory_stats(&self) -> DirectoryStats;
}
