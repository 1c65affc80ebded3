//! # Discovery Service
//!
//! Wires the peer directory to an [`AnnouncementChannel`] and runs the two
//! supervised background loops.
//!
//! ## Background Tasks
//!
//! - **Announcer**: re-sends `serviceName\tserviceURI` every period. A failed
//!   send is logged and retried on the next tick.
//! - **Listener**: receives datagrams, upserts the directory, and sweeps stale
//!   entries. Malformed datagrams are dropped; receive errors back off briefly.
//!
//! Both loops watch a shared shutdown signal. [`DiscoveryService::shutdown`]
//! raises it and joins every task, so teardown is deterministic.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use shared_types::{PeerResolver, ServiceUri, TimeSource};

use crate::domain::{
    Announcement, DirectoryStats, DiscoveryConfig, DiscoveryError, ObserveOutcome, PeerDirectory,
};
use crate::ports::{AnnouncementChannel, DiscoveryApi};

/// Counters for monitoring the discovery loops.
#[derive(Debug, Default)]
struct DiscoveryCounters {
    announcements_sent: AtomicU64,
    send_failures: AtomicU64,
    datagrams_received: AtomicU64,
    malformed_datagrams: AtomicU64,
    receive_failures: AtomicU64,
}

/// Point-in-time copy of the discovery counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryMetrics {
    pub announcements_sent: u64,
    pub send_failures: u64,
    pub datagrams_received: u64,
    pub malformed_datagrams: u64,
    pub receive_failures: u64,
}

pub struct DiscoveryService<C: AnnouncementChannel> {
    config: DiscoveryConfig,
    directory: Arc<PeerDirectory>,
    channel: Arc<C>,
    time_source: Arc<dyn TimeSource>,
    counters: DiscoveryCounters,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: AnnouncementChannel> DiscoveryService<C> {
    pub fn new(config: DiscoveryConfig, channel: Arc<C>, time_source: Arc<dyn TimeSource>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            directory: Arc::new(PeerDirectory::new(config.stale_after_ms)),
            config,
            channel,
            time_source,
            counters: DiscoveryCounters::default(),
            shutdown_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Shared handle to the underlying directory.
    pub fn directory(&self) -> Arc<PeerDirectory> {
        Arc::clone(&self.directory)
    }

    /// Start announcing `"<domain>:<service>" -> uri` until shutdown.
    pub fn announce(self: &Arc<Self>, domain: &str, service: &str, uri: ServiceUri) {
        let announcement = Announcement::for_domain(domain, service, uri);
        info!(
            service = %announcement.service_name,
            uri = %announcement.uri,
            period_ms = self.config.announce_period_ms,
            "Starting service announcer"
        );
        let handle = tokio::spawn(Arc::clone(self).run_announcer(announcement));
        self.tasks.lock().push(handle);
    }

    /// Start receiving announcements into the directory until shutdown.
    pub fn listen(self: &Arc<Self>) {
        info!(group = %self.config.multicast_group, "Starting discovery listener");
        let handle = tokio::spawn(Arc::clone(self).run_listener());
        self.tasks.lock().push(handle);
    }

    /// Send a single announcement immediately.
    pub async fn announce_once(&self, announcement: &Announcement) -> Result<(), DiscoveryError> {
        let result = self.channel.send(announcement.encode().as_bytes()).await;
        match &result {
            Ok(()) => self.counters.announcements_sent.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.counters.send_failures.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    /// Stop both loops and wait for them to finish.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        let handles: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Discovery task ended abnormally");
            }
        }
        info!(tasks = count, "Discovery stopped");
    }

    /// Number of background tasks currently owned by the service.
    pub fn running_tasks(&self) -> usize {
        self.tasks.lock().iter().filter(|h| !h.is_finished()).count()
    }

    pub fn metrics(&self) -> DiscoveryMetrics {
        let c = &self.counters;
        DiscoveryMetrics {
            announcements_sent: c.announcements_sent.load(Ordering::Relaxed),
            send_failures: c.send_failures.load(Ordering::Relaxed),
            datagrams_received: c.datagrams_received.load(Ordering::Relaxed),
            malformed_datagrams: c.malformed_datagrams.load(Ordering::Relaxed),
            receive_failures: c.receive_failures.load(Ordering::Relaxed),
        }
    }

    async fn run_announcer(self: Arc<Self>, announcement: Announcement) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.announce_period_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.announce_once(&announcement).await {
                        warn!(service = %announcement.service_name, error = %e, "Announcement failed, retrying next tick");
                    }
                }
            }
        }
        debug!(service = %announcement.service_name, "Announcer stopped");
    }

    async fn run_listener(self: Arc<Self>) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut buf = vec![0u8; self.config.effective_recv_buffer()];
        let mut sweep =
            tokio::time::interval(Duration::from_millis(self.config.eviction_interval_ms.max(1)));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let backoff = Duration::from_millis(self.config.receive_error_backoff_ms);

        while !*shutdown.borrow() {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = sweep.tick() => {
                    let removed = DiscoveryApi::evict_stale(self.as_ref());
                    if removed > 0 {
                        debug!(removed, "Evicted stale peers");
                    }
                }
                received = self.channel.recv(&mut buf) => match received {
                    Ok(len) => {
                        if let Err(e) = DiscoveryApi::handle_datagram(self.as_ref(), &buf[..len]) {
                            debug!(error = %e, len, "Discarding malformed announcement");
                        }
                    }
                    Err(e) => {
                        self.counters.receive_failures.fetch_add(1, Ordering::Relaxed);
                        warn!(error = %e, "Discovery receive failed");
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }
        debug!("Listener stopped");
    }
}

impl<C: AnnouncementChannel> DiscoveryApi for DiscoveryService<C> {
    fn resolve(&self, service_name: &str) -> Vec<ServiceUri> {
        self.directory.resolve(service_name, self.time_source.now())
    }

    fn handle_datagram(&self, bytes: &[u8]) -> Result<ObserveOutcome, DiscoveryError> {
        self.counters.datagrams_received.fetch_add(1, Ordering::Relaxed);
        let announcement = Announcement::decode(bytes).inspect_err(|_| {
            self.counters.malformed_datagrams.fetch_add(1, Ordering::Relaxed);
        })?;

        let outcome = self.directory.observe(
            &announcement.service_name,
            announcement.uri.clone(),
            self.time_source.now(),
        );
        if outcome == ObserveOutcome::Inserted {
            info!(service = %announcement.service_name, uri = %announcement.uri, "Discovered peer");
        }
        Ok(outcome)
    }

    fn evict_stale(&self) -> usize {
        self.directory.evict_stale(self.time_source.now())
    }

    fn known_services(&self) -> Vec<String> {
        self.directory.services()
    }

    fn directory_stats(&self) -> DirectoryStats {
        self.directory.stats(self.time_source.now())
    }
}

impl<C: AnnouncementChannel> PeerResolver for DiscoveryService<C> {
    fn resolve(&self, qualified_service_name: &str) -> Vec<ServiceUri> {
        DiscoveryApi::resolve(self, qualified_service_name)
    }
}
