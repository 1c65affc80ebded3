use std::net::{Ipv4Addr, SocketAddrV4};

/// Well-known multicast group shared by every instance.
pub const DEFAULT_MULTICAST_GROUP: SocketAddrV4 =
    SocketAddrV4::new(Ipv4Addr::new(226, 226, 226, 226), 2266);

/// Minimum receive buffer per datagram.
pub const MIN_RECV_BUFFER: usize = 1024;

/// Discovery tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Multicast group and port used for both announcing and listening.
    pub multicast_group: SocketAddrV4,
    /// Interval between two announcements of the same service (default: 1000 ms).
    pub announce_period_ms: u64,
    /// Entries not re-announced within this window are excluded from `resolve`
    /// and removed by eviction. `None` keeps entries forever.
    pub stale_after_ms: Option<u64>,
    /// How often the listener sweeps stale entries (default: 1000 ms).
    pub eviction_interval_ms: u64,
    /// Receive buffer per datagram, never below [`MIN_RECV_BUFFER`].
    pub recv_buffer_size: usize,
    /// Pause after a failed receive before trying again.
    pub receive_error_backoff_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            multicast_group: DEFAULT_MULTICAST_GROUP,
            announce_period_ms: 1_000,
            stale_after_ms: Some(5_000),
            eviction_interval_ms: 1_000,
            recv_buffer_size: MIN_RECV_BUFFER,
            receive_error_backoff_ms: 100,
        }
    }
}

impl DiscoveryConfig {
    /// Create a config suitable for testing (fast ticks).
    pub fn for_testing() -> Self {
        Self {
            announce_period_ms: 10,
            stale_after_ms: Some(50),
            eviction_interval_ms: 10,
            receive_error_backoff_ms: 5,
            ..Self::default()
        }
    }

    pub fn effective_recv_buffer(&self) -> usize {
        self.recv_buffer_size.max(MIN_RECV_BUFFER)
    }
}
