//! UDP multicast announcement channel (requires "network" feature).

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::UdpSocket;
use tracing::info;

use crate::domain::DiscoveryError;
use crate::ports::AnnouncementChannel;

/// Multicast socket joined to the discovery group.
///
/// The same socket is used for sending and receiving; loopback is enabled so
/// that instances on the same host discover each other.
pub struct MulticastChannel {
    socket: UdpSocket,
    group: SocketAddrV4,
}

impl MulticastChannel {
    /// Bind to the group's port on all interfaces and join the group.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Bind`] if the port is taken or the group
    /// cannot be joined.
    pub async fn bind(group: SocketAddrV4) -> Result<Self, DiscoveryError> {
        let bind_err = |e: std::io::Error| DiscoveryError::Bind(e.to_string());

        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, group.port()))
            .await
            .map_err(bind_err)?;
        socket
            .join_multicast_v4(*group.ip(), Ipv4Addr::UNSPECIFIED)
            .map_err(bind_err)?;
        socket.set_multicast_loop_v4(true).map_err(bind_err)?;
        socket.set_multicast_ttl_v4(1).map_err(bind_err)?;

        info!(%group, "Joined discovery multicast group");
        Ok(Self { socket, group })
    }

    pub fn group(&self) -> SocketAddrV4 {
        self.group
    }
}

#[async_trait]
impl AnnouncementChannel for MulticastChannel {
    async fn send(&self, payload: &[u8]) -> Result<(), DiscoveryError> {
        self.socket
            .send_to(payload, self.group)
            .await
            .map(|_| ())
            .map_err(|e| DiscoveryError::Send(e.to_string()))
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, DiscoveryError> {
        self.socket
            .recv_from(buf)
            .await
            .map(|(len, _from)| len)
            .map_err(|e| DiscoveryError::Receive(e.to_string()))
    }
}
