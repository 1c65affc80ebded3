//! Announcement channel chosen at startup.

use async_trait::async_trait;
use std::net::SocketAddrV4;

use ss_01_service_discovery::{
    AnnouncementChannel, DiscoveryError, InMemoryChannel, MulticastChannel,
};

pub enum DiscoveryChannel {
    Multicast(MulticastChannel),
    /// For in-process clusters and tests.
    InMemory(InMemoryChannel),
}

impl DiscoveryChannel {
    pub async fn multicast(group: SocketAddrV4) -> Result<Self, DiscoveryError> {
        Ok(Self::Multicast(MulticastChannel::bind(group).await?))
    }
}

#[async_trait]
impl AnnouncementChannel for DiscoveryChannel {
    async fn send(&self, payload: &[u8]) -> Result<(), DiscoveryError> {
        match self {
            Self::Multicast(channel) => channel.send(payload).await,
            Self::InMemory(channel) => channel.send(payload).await,
        }
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, DiscoveryError> {
        match self {
            Self::Multicast(channel) => channel.recv(buf).await,
            Self::InMemory(channel) => channel.recv(buf).await,
        }
    }
}
