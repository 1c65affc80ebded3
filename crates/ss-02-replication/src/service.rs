//! # Replication Coordinator
//!
//! Primary-side half of replication: stamps every accepted mutation with the
//! next version and pushes its encoding to the other instances of the domain.
//!
//! ## Propagation
//!
//! One worker task per peer sends the operation under the configured
//! [`RetryPolicy`](shared_types::RetryPolicy). The caller is released on the
//! first acknowledgement; remaining workers keep running and their results are
//! only logged. When every worker fails the caller is released as well, and
//! the failure is reported through the returned stats rather than an error.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use shared_types::{qualified_service_name, ServiceUri, Version, VERSION_HEADER};

use crate::domain::{
    CoordinatorMetrics, PropagationStats, ReplicationConfig, ReplicationError, SheetOperation,
    VersionCounter,
};
use crate::ports::{PeerResolver, ReplicaTransport, ReplicationApi, VersionStamped};

#[derive(Debug, Default)]
struct CoordinatorCounters {
    operations_propagated: AtomicU64,
    acks_received: AtomicU64,
    propagations_without_ack: AtomicU64,
    send_failures: AtomicU64,
}

pub struct ReplicationCoordinator<R: PeerResolver, T: ReplicaTransport> {
    config: ReplicationConfig,
    versions: VersionCounter,
    resolver: R,
    transport: Arc<T>,
    counters: Arc<CoordinatorCounters>,
}

impl<R: PeerResolver, T: ReplicaTransport> ReplicationCoordinator<R, T> {
    pub fn new(config: ReplicationConfig, resolver: R, transport: Arc<T>) -> Self {
        Self {
            versions: VersionCounter::starting_at(config.initial_version()),
            config,
            resolver,
            transport,
            counters: Arc::new(CoordinatorCounters::default()),
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn next_version(&self) -> Version {
        self.versions.next()
    }

    pub fn current_version(&self) -> Version {
        self.versions.current()
    }

    /// Other instances of `domain` that should receive operations.
    pub fn replica_peers(&self, domain: &str, local_uri: &ServiceUri) -> Vec<ServiceUri> {
        let service = qualified_service_name(domain, &self.config.service_name);
        self.resolver
            .resolve(&service)
            .into_iter()
            .filter(|peer| peer != local_uri)
            .collect()
    }

    pub async fn propagate(
        &self,
        encoded: &str,
        version: Version,
        domain: &str,
        local_uri: &ServiceUri,
        secret: &str,
    ) -> PropagationStats {
        self.counters
            .operations_propagated
            .fetch_add(1, Ordering::Relaxed);

        let peers = self.replica_peers(domain, local_uri);
        let mut stats = PropagationStats {
            version,
            peers_targeted: peers.len(),
            first_ack: None,
            failures: 0,
        };

        if peers.is_empty() {
            debug!(%version, domain, "No replicas known, nothing to propagate");
            self.counters
                .propagations_without_ack
                .fetch_add(1, Ordering::Relaxed);
            return stats;
        }

        let (results_tx, mut results_rx) = mpsc::channel(peers.len());
        let encoded: Arc<str> = Arc::from(encoded);
        let secret: Arc<str> = Arc::from(secret);
        let policy = self.config.retry_policy();

        for peer in peers {
            let results_tx = results_tx.clone();
            let transport = Arc::clone(&self.transport);
            let counters = Arc::clone(&self.counters);
            let encoded = Arc::clone(&encoded);
            let secret = Arc::clone(&secret);

            tokio::spawn(async move {
                let result = policy
                    .run(|_| transport.send_operation(&peer, &encoded, version, &secret))
                    .await;

                match &result {
                    Ok(()) => {
                        counters.acks_received.fetch_add(1, Ordering::Relaxed);
                        debug!(%peer, %version, "Replica acknowledged operation");
                    }
                    Err(e) => {
                        counters.send_failures.fetch_add(1, Ordering::Relaxed);
                        debug!(%peer, %version, error = %e, "Replica did not acknowledge operation");
                    }
                }

                // The caller may already be gone after an earlier ack.
                let _ = results_tx.send((peer, result)).await;
            });
        }
        drop(results_tx);

        while let Some((peer, result)) = results_rx.recv().await {
            match result {
                Ok(()) => {
                    stats.first_ack = Some(peer);
                    return stats;
                }
                Err(_) => stats.failures += 1,
            }
        }

        self.counters
            .propagations_without_ack
            .fetch_add(1, Ordering::Relaxed);
        warn!(
            %version,
            domain,
            peers = stats.peers_targeted,
            "Operation was not acknowledged by any replica"
        );
        stats
    }

    /// Encode `operation`, assign it the next version and propagate it.
    ///
    /// The version is only consumed once encoding succeeded.
    pub async fn replicate(
        &self,
        operation: &SheetOperation,
        domain: &str,
        local_uri: &ServiceUri,
        secret: &str,
    ) -> Result<PropagationStats, ReplicationError> {
        let encoded = operation.encode()?;
        let version = self.next_version();
        Ok(self
            .propagate(&encoded, version, domain, local_uri, secret)
            .await)
    }

    /// Attach the current version as the `X-SHEETS-version` header.
    pub fn stamp_response<S: VersionStamped + ?Sized>(&self, response: &mut S) {
        response.insert_header(VERSION_HEADER, self.current_version().to_string());
    }

    pub fn metrics(&self) -> CoordinatorMetrics {
        let c = &self.counters;
        CoordinatorMetrics {
            current_version: self.current_version().get(),
            operations_propagated: c.operations_propagated.load(Ordering::Relaxed),
            acks_received: c.acks_received.load(Ordering::Relaxed),
            propagations_without_ack: c.propagations_without_ack.load(Ordering::Relaxed),
            send_failures: c.send_failures.load(Ordering::Relaxed),
        }
    }

    /// Log the starting point of the counter.
    pub fn log_startup(&self) {
        info!(
            service = %self.config.service_name,
            version = %self.current_version(),
            "Replication coordinator ready"
        );
    }
}

#[async_trait]
impl<R: PeerResolver, T: ReplicaTransport> ReplicationApi for ReplicationCoordinator<R, T> {
    fn next_version(&self) -> Version {
        ReplicationCoordinator::next_version(self)
    }

    fn current_version(&self) -> Version {
        ReplicationCoordinator::current_version(self)
    }

    async fn propagate(
        &self,
        encoded: &str,
        version: Version,
        domain: &str,
        local_uri: &ServiceUri,
        secret: &str,
    ) -> PropagationStats {
        ReplicationCoordinator::propagate(self, encoded, version, domain, local_uri, secret).await
    }
}

#[cfg(test)]
mod tests;
