//! # Shared Ports
//!
//! Driven ports needed by more than one subsystem. The runtime provides the
//! concrete implementations and injects them.

use crate::entities::{ServiceUri, Timestamp};

/// Abstract interface for time-related operations.
///
/// Enables deterministic testing by injecting controllable time sources.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Production time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        Timestamp::from_millis(duration.as_millis() as u64)
    }
}

/// Lookup of currently reachable instances of a qualified service name.
///
/// An empty result is a valid answer meaning "no peer known".
pub trait PeerResolver: Send + Sync {
    fn resolve(&self, qualified_service_name: &str) -> Vec<ServiceUri>;
}

impl<T: PeerResolver + ?Sized> PeerResolver for std::sync::Arc<T> {
    fn resolve(&self, qualified_service_name: &str) -> Vec<ServiceUri> {
        (**self).resolve(qualified_service_name)
    }
}
