//! # Adapters
//!
//! - `InMemoryChannel` - loopback broadcast for tests and in-process clusters
//! - `MulticastChannel` - UDP multicast socket (requires "network" feature)

pub mod memory;
#[cfg(feature = "network")]
pub mod multicast;

pub use memory::{InMemoryChannel, InMemoryNetwork};
#[cfg(feature = "network")]
pub use multicast::MulticastChannel;
