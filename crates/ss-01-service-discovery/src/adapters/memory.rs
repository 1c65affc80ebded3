//! In-process announcement channel.
//!
//! Every [`InMemoryChannel`] created from the same [`InMemoryNetwork`] sees
//! every datagram sent on that network, its own included, the same way a
//! multicast socket with loopback enabled does.

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use crate::domain::DiscoveryError;
use crate::ports::AnnouncementChannel;

const DEFAULT_CAPACITY: usize = 1024;

/// Shared medium for in-memory channels.
#[derive(Clone)]
pub struct InMemoryNetwork {
    sender: broadcast::Sender<Vec<u8>>,
}

impl InMemoryNetwork {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Attach a new endpoint to the network.
    pub fn channel(&self) -> InMemoryChannel {
        InMemoryChannel {
            sender: self.sender.clone(),
            receiver: Mutex::new(self.sender.subscribe()),
        }
    }

    /// Inject a raw datagram as if some instance had sent it.
    pub fn inject(&self, payload: &[u8]) {
        let _ = self.sender.send(payload.to_vec());
    }
}

impl Default for InMemoryNetwork {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryChannel {
    sender: broadcast::Sender<Vec<u8>>,
    receiver: Mutex<broadcast::Receiver<Vec<u8>>>,
}

#[async_trait]
impl AnnouncementChannel for InMemoryChannel {
    async fn send(&self, payload: &[u8]) -> Result<(), DiscoveryError> {
        self.sender
            .send(payload.to_vec())
            .map(|_| ())
            .map_err(|_| DiscoveryError::Send("no listeners attached".into()))
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, DiscoveryError> {
        let mut receiver = self.receiver.lock().await;
        match receiver.recv().await {
            Ok(datagram) => {
                // Oversized datagrams are truncated like a UDP receive would.
                let len = datagram.len().min(buf.len());
                buf[..len].copy_from_slice(&datagram[..len]);
                Ok(len)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => Err(DiscoveryError::Receive(
                format!("listener lagged, {skipped} datagrams skipped"),
            )),
            Err(broadcast::error::RecvError::Closed) => {
                Err(DiscoveryError::Receive("network closed".into()))
            }
        }
    }
}
