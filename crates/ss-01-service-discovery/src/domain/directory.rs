//! Peer directory: qualified service name -> live endpoints.
//!
//! ## Invariants
//!
//! - At most one entry per distinct URI per service name (exact string match).
//! - Re-observing a URI refreshes `last_seen`; it never adds a second entry.
//! - All mutation happens under the write lock, so a reader holding the read
//!   lock never sees a half-updated entry.

use parking_lot::RwLock;
use shared_types::{ServiceUri, Timestamp};
use std::collections::HashMap;

/// One known endpoint of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub uri: ServiceUri,
    pub last_seen: Timestamp,
}

/// Result of recording an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveOutcome {
    /// First time this URI was seen for the service.
    Inserted,
    /// URI was already known; its last-seen marker was reset.
    Refreshed,
}

/// Directory statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    pub services: usize,
    pub entries: usize,
    pub fresh_entries: usize,
}

pub struct PeerDirectory {
    entries: RwLock<HashMap<String, Vec<DirectoryEntry>>>,
    stale_after_ms: Option<u64>,
}

impl PeerDirectory {
    pub fn new(stale_after_ms: Option<u64>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stale_after_ms,
        }
    }

    /// Record that `uri` announced `service_name` at `now`.
    pub fn observe(&self, service_name: &str, uri: ServiceUri, now: Timestamp) -> ObserveOutcome {
        let mut entries = self.entries.write();
        let peers = entries.entry(service_name.to_string()).or_default();

        match peers.iter_mut().find(|e| e.uri == uri) {
            Some(existing) => {
                // Never move the marker backwards on a late datagram.
                existing.last_seen = existing.last_seen.max(now);
                ObserveOutcome::Refreshed
            }
            None => {
                peers.push(DirectoryEntry {
                    uri,
                    last_seen: now,
                });
                ObserveOutcome::Inserted
            }
        }
    }

    /// Fresh endpoints for `service_name`, in first-seen order.
    pub fn resolve(&self, service_name: &str, now: Timestamp) -> Vec<ServiceUri> {
        self.entries
            .read()
            .get(service_name)
            .map(|peers| {
                peers
                    .iter()
                    .filter(|e| self.is_fresh(e, now))
                    .map(|e| e.uri.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All entries for `service_name`, fresh or not.
    pub fn entries(&self, service_name: &str) -> Vec<DirectoryEntry> {
        self.entries
            .read()
            .get(service_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Remove entries that have not been re-announced within the stale window.
    ///
    /// Returns the number of entries removed.
    pub fn evict_stale(&self, now: Timestamp) -> usize {
        if self.stale_after_ms.is_none() {
            return 0;
        }

        let mut entries = self.entries.write();
        let mut removed = 0;
        for peers in entries.values_mut() {
            let before = peers.len();
            peers.retain(|e| self.is_fresh(e, now));
            removed += before - peers.len();
        }
        entries.retain(|_, peers| !peers.is_empty());
        removed
    }

    /// Service names with at least one entry.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn stats(&self, now: Timestamp) -> DirectoryStats {
        let entries = self.entries.read();
        DirectoryStats {
            services: entries.len(),
            entries: entries.values().map(Vec::len).sum(),
            fresh_entries: entries
                .values()
                .flat_map(|peers| peers.iter())
                .filter(|e| self.is_fresh(e, now))
                .count(),
        }
    }

    fn is_fresh(&self, entry: &DirectoryEntry, now: Timestamp) -> bool {
        match self.stale_after_ms {
            Some(window) => now.millis_since(entry.last_seen) <= window,
            None => true,
        }
    }
}
