//! # In-Process Cluster
//!
//! Several sheets runtimes sharing one in-memory multicast network. Peer
//! calls go through [`LoopbackTransport`], which invokes the target
//! instance's handlers directly, so every hop still passes secret checks,
//! version header parsing and JSON encoding.
//!
//! Faults can be injected per instance to simulate partitions.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use sheets_runtime::adapters::DiscoveryChannel;
use sheets_runtime::container::{ConfigError, NodeConfig, NodeContainer};
use sheets_runtime::handlers::{RangeHandler, ReplicaHandler, Response};
use sheets_runtime::SheetsRuntime;
use shared_types::{
    ImportKey, PeerResolver, ServiceUri, SystemTimeSource, TransportError, Version,
};
use ss_01_service_discovery::InMemoryNetwork;
use ss_02_replication::ReplicaTransport;
use ss_04_result_cache::{FetchedRange, RemoteRangeFetcher};

pub type Node = SheetsRuntime<LoopbackTransport>;

/// How calls to an instance fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Connection refused.
    Unreachable,
    /// Never answers; the caller's deadline fires.
    Hang,
}

#[derive(Default)]
pub struct LoopbackTransport {
    nodes: RwLock<HashMap<ServiceUri, Weak<NodeContainer<LoopbackTransport>>>>,
    faults: RwLock<HashMap<ServiceUri, Fault>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, container: &Arc<NodeContainer<LoopbackTransport>>) {
        self.nodes
            .write()
            .insert(container.local_uri.clone(), Arc::downgrade(container));
    }

    pub fn inject(&self, uri: &ServiceUri, fault: Fault) {
        self.faults.write().insert(uri.clone(), fault);
    }

    pub fn heal(&self, uri: &ServiceUri) {
        self.faults.write().remove(uri);
    }

    async fn reach(
        &self,
        peer: &ServiceUri,
    ) -> Result<Arc<NodeContainer<LoopbackTransport>>, TransportError> {
        let fault = self.faults.read().get(peer).copied();
        match fault {
            Some(Fault::Unreachable) => {
                return Err(TransportError::Unreachable(peer.to_string()));
            }
            Some(Fault::Hang) => std::future::pending::<()>().await,
            None => {}
        }
        let node = self.nodes.read().get(peer).and_then(Weak::upgrade);
        node.ok_or_else(|| TransportError::Unreachable(peer.to_string()))
    }
}

fn into_result(response: Response) -> Result<Response, TransportError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Rejected {
            status: response.status,
        })
    }
}

#[async_trait]
impl ReplicaTransport for LoopbackTransport {
    async fn send_operation(
        &self,
        peer: &ServiceUri,
        encoded: &str,
        version: Version,
        secret: &str,
    ) -> Result<(), TransportError> {
        let node = self.reach(peer).await?;
        let header = version.to_string();
        into_result(ReplicaHandler::new(node).receive(secret, Some(&header), encoded)).map(|_| ())
    }
}

#[async_trait]
impl RemoteRangeFetcher for LoopbackTransport {
    async fn fetch_range(
        &self,
        peer: &ServiceUri,
        key: &ImportKey,
        secret: &str,
    ) -> Result<FetchedRange, TransportError> {
        let node = self.reach(peer).await?;
        let response = into_result(RangeHandler::new(node).range(&key.sheet_id, &key.range, secret))?;
        serde_json::from_str(response.body.as_deref().unwrap_or_default())
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

pub struct Cluster {
    network: InMemoryNetwork,
    transport: Arc<LoopbackTransport>,
    nodes: Vec<Node>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster {
    pub fn new() -> Self {
        Self {
            network: InMemoryNetwork::new(),
            transport: Arc::new(LoopbackTransport::new()),
            nodes: Vec::new(),
        }
    }

    pub fn transport(&self) -> &Arc<LoopbackTransport> {
        &self.transport
    }

    /// Start an instance of `domain` at `uri` with the given configured
    /// primary. Returns its index.
    pub fn spawn(
        &mut self,
        domain: &str,
        uri: &str,
        primary: Option<&str>,
    ) -> Result<usize, ConfigError> {
        let mut config = NodeConfig::for_testing(domain, uri);
        config.leadership.primary_uri = primary.map(str::to_string);

        let container = NodeContainer::new(
            config,
            DiscoveryChannel::InMemory(self.network.channel()),
            Arc::clone(&self.transport),
            Arc::new(SystemTimeSource::new()),
        )?;
        let runtime = SheetsRuntime::new(container);
        self.transport.register(runtime.container());
        runtime.start();

        self.nodes.push(runtime);
        Ok(self.nodes.len() - 1)
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn uri(&self, index: usize) -> ServiceUri {
        self.nodes[index].container().local_uri.clone()
    }

    /// Wait until instance `index` resolves `service` to `count` peers.
    pub async fn await_resolved(&self, index: usize, service: &str, count: usize) -> bool {
        let discovery = &self.nodes[index].container().discovery;
        eventually(|| PeerResolver::resolve(discovery.as_ref(), service).len() == count).await
    }

    /// Elect `uri` on every instance's leadership oracle.
    pub fn elect(&self, uri: &ServiceUri) {
        for node in &self.nodes {
            node.container().oracle.elect(uri.clone());
        }
    }

    pub async fn shutdown(self) {
        for node in &self.nodes {
            node.shutdown().await;
        }
    }
}

/// Poll `condition` for up to one second.
pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
