//! # Ports Layer
//!
//! - **inbound**: `DiscoveryApi`, what the node calls
//! - **outbound**: `AnnouncementChannel` and `TimeSource`, what the node provides

pub mod inbound;
pub mod outbound;

pub use inbound::DiscoveryApi;
pub use outbound::{AnnouncementChannel, TimeSource};
