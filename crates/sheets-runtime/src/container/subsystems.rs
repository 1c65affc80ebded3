//! # Subsystem Container
//!
//! Holds the coordination subsystems of one instance and the state they
//! share.
//!
//! ## Wiring
//!
//! ```text
//! DiscoveryService ──PeerResolver──→ ReplicationCoordinator
//!        │                                   │ ReplicaTransport
//!        └─────────PeerResolver──→ ImportService
//!                                            │ RemoteRangeFetcher
//!                                      PeerTransport (HTTP)
//!
//! StaticLeadershipOracle ──on_primary_change──→ PrimarySelector
//! InMemorySheetStore ←──OperationApplier── ReplicaApplier
//! ```
//!
//! ## Thread Safety
//!
//! - Everything shared is behind `Arc`; no globals.
//! - `write_lock` serializes local apply + version assignment on the primary.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

use shared_types::{ServiceUri, TimeSource};
use ss_01_service_discovery::DiscoveryService;
use ss_02_replication::{ReplicaApplier, ReplicationCoordinator};
use ss_03_primary_selector::{PrimarySelector, StaticLeadershipOracle};
use ss_04_result_cache::{ImportService, ResultCache};

use crate::adapters::{DiscoveryChannel, HttpPeerClient, InMemorySheetStore, PeerTransport};
use crate::container::config::{ConfigError, NodeConfig};

pub type Discovery = DiscoveryService<DiscoveryChannel>;
pub type Coordinator<T> = ReplicationCoordinator<Arc<Discovery>, T>;
pub type Imports<T> = ImportService<Arc<Discovery>, T>;
pub type Replica = ReplicaApplier<Arc<InMemorySheetStore>>;

pub struct NodeContainer<T: PeerTransport = HttpPeerClient> {
    pub config: NodeConfig,
    pub local_uri: ServiceUri,
    pub store: Arc<InMemorySheetStore>,
    pub discovery: Arc<Discovery>,
    pub coordinator: Arc<Coordinator<T>>,
    pub replica: Arc<Replica>,
    pub oracle: Arc<StaticLeadershipOracle>,
    pub selector: PrimarySelector,
    pub imports: Arc<Imports<T>>,
    pub(crate) write_lock: Mutex<()>,
}

impl<T: PeerTransport> NodeContainer<T> {
    pub fn new(
        config: NodeConfig,
        channel: DiscoveryChannel,
        transport: Arc<T>,
        time_source: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        let local_uri = config.local_uri();
        let discovery_config = config.discovery.to_discovery_config()?;

        let store = Arc::new(InMemorySheetStore::new(Arc::clone(&time_source)));
        let discovery = Arc::new(DiscoveryService::new(
            discovery_config,
            Arc::new(channel),
            Arc::clone(&time_source),
        ));

        let coordinator = Arc::new(ReplicationCoordinator::new(
            config.replication.clone(),
            Arc::clone(&discovery),
            Arc::clone(&transport),
        ));
        let replica = Arc::new(ReplicaApplier::starting_after(
            Arc::clone(&store),
            config.replication.initial_version(),
            config.replication.reorder_capacity,
        ));

        let oracle = Arc::new(StaticLeadershipOracle::new(config.primary_uri()));
        let selector = PrimarySelector::new(local_uri.clone(), oracle.as_ref());

        let cache = Arc::new(ResultCache::new(time_source));
        let imports = Arc::new(ImportService::new(
            config.cache.clone(),
            cache,
            Arc::clone(&discovery),
            transport,
        ));

        info!(
            domain = %config.node.domain,
            service = %config.node.service_name,
            local = %local_uri,
            "Subsystem container initialized"
        );

        Ok(Self {
            config,
            local_uri,
            store,
            discovery,
            coordinator,
            replica,
            oracle,
            selector,
            imports,
            write_lock: Mutex::new(()),
        })
    }

    pub fn domain(&self) -> &str {
        &self.config.node.domain
    }

    pub fn service_name(&self) -> &str {
        &self.config.node.service_name
    }
}
