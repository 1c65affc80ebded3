//! # Domain Layer for Service Discovery
//!
//! Pure logic with no I/O: the announcement codec and the peer directory.
//!
//! ## Contents
//!
//! - **announcement**: `Announcement` encode/decode (`serviceName\tserviceURI`)
//! - **directory**: `PeerDirectory` with dedup-by-URI and stale eviction
//! - **config**: `DiscoveryConfig` and protocol constants
//! - **errors**: `DiscoveryError`

mod announcement;
mod config;
mod directory;
mod errors;

pub use announcement::*;
pub use config::*;
pub use directory::*;
pub use errors::*;
