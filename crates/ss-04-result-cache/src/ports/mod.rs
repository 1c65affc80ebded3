//! # Ports Layer
//!
//! - **inbound**: `ImportApi`, used by formula evaluation for remote ranges
//! - **outbound**: `RemoteRangeFetcher`, `PeerResolver`, `TimeSource`

pub mod inbound;
pub mod outbound;

pub use inbound::ImportApi;
pub use outbound::{FetchedRange, PeerResolver, RemoteRangeFetcher, TimeSource};
