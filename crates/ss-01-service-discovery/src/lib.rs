//! # Service Discovery Subsystem
//!
//! Registry-free discovery of sheets and users server instances. Every
//! instance periodically multicasts `"<domain>:<service>\t<uri>"`; every
//! instance listens and keeps a directory of live peers per service name.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** announcement codec, `PeerDirectory` (dedup by URI, stale eviction)
//! - **Ports Layer:** `DiscoveryApi` (inbound), `AnnouncementChannel` / `TimeSource` (outbound)
//! - **Service Layer:** `DiscoveryService` with supervised announce/listen loops
//! - **Adapters Layer:** in-memory channel, UDP multicast channel (feature `network`)
//!
//! ## Example
//!
//! ```rust
//! use ss_01_service_discovery::{PeerDirectory, ServiceUri, Timestamp};
//!
//! let directory = PeerDirectory::new(Some(5_000));
//! let uri = ServiceUri::new("http://h1:8080/rest");
//! directory.observe("fct:sheets", uri.clone(), Timestamp::from_millis(1_000));
//! directory.observe("fct:sheets", uri.clone(), Timestamp::from_millis(1_500));
//!
//! assert_eq!(directory.resolve("fct:sheets", Timestamp::from_millis(1_500)), vec![uri]);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (ControllableTimeSource)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::{
    Announcement, DirectoryEntry, DirectoryStats, DiscoveryConfig, DiscoveryError,
    ObserveOutcome, PeerDirectory, DEFAULT_MULTICAST_GROUP, MIN_RECV_BUFFER,
};
pub use ports::{AnnouncementChannel, DiscoveryApi, TimeSource};
pub use service::{DiscoveryMetrics, DiscoveryService};
pub use shared_types::{ServiceUri, Timestamp};

pub use adapters::{InMemoryChannel, InMemoryNetwork};
#[cfg(feature = "network")]
pub use adapters::MulticastChannel;
