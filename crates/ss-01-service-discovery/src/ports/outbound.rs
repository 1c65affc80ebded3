//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this subsystem requires the host to provide.

use async_trait::async_trait;

use crate::domain::DiscoveryError;

pub use shared_types::TimeSource;

/// Datagram channel carrying announcements between instances.
///
/// Production uses a UDP multicast socket; tests use an in-memory broadcast.
/// `send` and `recv` may be called concurrently from different tasks.
#[async_trait]
pub trait AnnouncementChannel: Send + Sync + 'static {
    /// Transmit one announcement datagram to every listener.
    async fn send(&self, payload: &[u8]) -> Result<(), DiscoveryError>;

    /// Wait for the next datagram and copy it into `buf`.
    ///
    /// Returns the number of bytes written. Must be cancel-safe: the listener
    /// drops this future when shutting down.
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, DiscoveryError>;
}
