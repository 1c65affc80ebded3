//! # Sheets Runtime
//!
//! Runs the coordination core of one sheets server instance.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the subsystem container
//! - `adapters/` - multicast channel, peer HTTP client, in-memory store
//! - `handlers/` - write path, replica intake, range reads, imports
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, TOML file, environment)
//! 2. Validate it for production (non-empty secret, http local URI)
//! 3. Join the multicast group, build the peer HTTP client
//! 4. Start listening, then announcing `"<domain>:sheets"`
//! 5. Watch the primary pointer, start the cache sweeper
//!
//! Shutdown signals every background task through one `watch` channel and
//! waits for them.

pub mod adapters;
pub mod container;
pub mod handlers;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shared_types::SystemTimeSource;

use crate::adapters::{DiscoveryChannel, HttpPeerClient, PeerTransport};
use crate::container::{NodeConfig, NodeContainer};
use crate::handlers::{ImportHandler, RangeHandler, ReplicaHandler, WriteHandler};

/// Install the global `tracing` subscriber.
///
/// The filter comes from `SS_LOG_LEVEL`, then `RUST_LOG`, defaulting to `info`.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env("SS_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

/// One running sheets instance.
pub struct SheetsRuntime<T: PeerTransport = HttpPeerClient> {
    container: Arc<NodeContainer<T>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SheetsRuntime<HttpPeerClient> {
    /// Production wiring: multicast discovery, HTTP peer client, system clock.
    pub async fn bind(config: NodeConfig) -> Result<Self> {
        let group = config
            .discovery
            .to_discovery_config()
            .context("Invalid discovery configuration")?
            .multicast_group;
        let channel = DiscoveryChannel::multicast(group)
            .await
            .with_context(|| format!("Failed to join multicast group {group}"))?;
        let transport = HttpPeerClient::new(
            config.http.connect_timeout(),
            config.http.request_timeout(),
        )
        .context("Failed to build peer HTTP client")?;

        let container = NodeContainer::new(
            config,
            channel,
            Arc::new(transport),
            Arc::new(SystemTimeSource::new()),
        )
        .context("Failed to initialize subsystems")?;
        Ok(Self::new(container))
    }
}

impl<T: PeerTransport> SheetsRuntime<T> {
    pub fn new(container: NodeContainer<T>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn container(&self) -> &Arc<NodeContainer<T>> {
        &self.container
    }

    pub fn write_handler(&self) -> WriteHandler<T> {
        WriteHandler::new(Arc::clone(&self.container))
    }

    pub fn replica_handler(&self) -> ReplicaHandler<T> {
        ReplicaHandler::new(Arc::clone(&self.container))
    }

    pub fn range_handler(&self) -> RangeHandler<T> {
        RangeHandler::new(Arc::clone(&self.container))
    }

    pub fn import_handler(&self) -> ImportHandler<T> {
        ImportHandler::new(Arc::clone(&self.container))
    }

    /// Start all background tasks. Must be called from within a tokio runtime.
    pub fn start(&self) {
        let container = &self.container;
        info!("===========================================");
        info!("  Sheets instance {}", container.local_uri);
        info!("  Domain: {}", container.domain());
        info!("===========================================");

        container.discovery.listen();
        container.discovery.announce(
            container.domain(),
            container.service_name(),
            container.local_uri.clone(),
        );
        container.coordinator.log_startup();

        let mut tasks = self.tasks.lock();
        tasks.push(self.spawn_primary_watch());
        if let Some(sweeper) = container.imports.spawn_sweeper(self.shutdown_rx.clone()) {
            tasks.push(sweeper);
        }

        info!(
            role = %container.selector.role(),
            primary = ?container.selector.current_primary(),
            "Sheets instance running"
        );
    }

    /// A new primary restarts version numbering, so replica ordering state
    /// from the previous one must go.
    fn spawn_primary_watch(&self) -> JoinHandle<()> {
        let container = Arc::clone(&self.container);
        let mut primary_rx = container.selector.subscribe_primary();
        let mut shutdown = self.shutdown_rx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    changed = primary_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let primary = primary_rx.borrow_and_update().clone();
                        info!(
                            primary = ?primary,
                            role = %container.selector.role(),
                            "Primary changed, resetting replica ordering"
                        );
                        container.replica.reset();
                    }
                }
            }
            debug!("Primary watch stopped");
        })
    }

    /// Signal every task and wait for them to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down sheets instance");
        self.shutdown_tx.send_replace(true);
        self.container.discovery.shutdown().await;

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            let _ = task.await;
        }
        info!("Sheets instance stopped");
    }
}
