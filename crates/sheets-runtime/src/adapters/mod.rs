//! # Adapters
//!
//! Concrete implementations of the subsystems' outbound ports.
//!
//! - `DiscoveryChannel` - multicast socket or in-memory medium for discovery
//! - `HttpPeerClient` - replication transport and remote range fetcher over HTTP
//! - `InMemorySheetStore` - spreadsheet storage backend, also the replica applier

pub mod channel;
pub mod http;
pub mod store;

pub use channel::DiscoveryChannel;
pub use http::{HttpPeerClient, PeerTransport};
pub use store::{InMemorySheetStore, StoreError};
