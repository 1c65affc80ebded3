//! # Import Service
//!
//! Cross-domain range import with cache fallback:
//!
//! 1. Resolve the remote domain's sheets instances.
//! 2. Try each in turn (bounded retries, per-attempt deadline).
//! 3. On success, reconcile into the cache and return the reconciled entry.
//! 4. Otherwise return the cached copy, or `NoData` if there never was one.
//!
//! A partition thus degrades to "last known good" instead of an error.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use shared_types::{qualified_service_name, CellGrid, ImportKey, ServiceUri, TransportError};

use crate::domain::{CacheConfig, CacheEntry, CacheError, ResultCache};
use crate::ports::{FetchedRange, ImportApi, PeerResolver, RemoteRangeFetcher};

/// What an import produced.
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    /// A peer answered. `entry` is the cache entry after reconciling, which
    /// may be newer than what the peer sent (`applied == false`).
    Live {
        peer: ServiceUri,
        applied: bool,
        entry: Arc<CacheEntry>,
    },
    /// No peer answered; last known good values.
    Cached(Arc<CacheEntry>),
    /// No peer answered and nothing was ever cached for the key.
    NoData,
}

impl ImportOutcome {
    pub fn entry(&self) -> Option<&Arc<CacheEntry>> {
        match self {
            Self::Live { entry, .. } | Self::Cached(entry) => Some(entry),
            Self::NoData => None,
        }
    }

    pub fn values(&self) -> Option<&CellGrid> {
        self.entry().map(|entry| entry.values.as_ref())
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

#[derive(Debug, Default)]
struct ImportCounters {
    live_fetches: AtomicU64,
    cache_fallbacks: AtomicU64,
    no_data: AtomicU64,
    fetch_failures: AtomicU64,
    evicted: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMetrics {
    pub live_fetches: u64,
    pub cache_fallbacks: u64,
    pub no_data: u64,
    pub fetch_failures: u64,
    pub evicted: u64,
    pub entries: usize,
}

pub struct ImportService<R: PeerResolver, F: RemoteRangeFetcher> {
    config: CacheConfig,
    cache: Arc<ResultCache>,
    resolver: R,
    fetcher: Arc<F>,
    counters: ImportCounters,
}

impl<R: PeerResolver, F: RemoteRangeFetcher> ImportService<R, F> {
    pub fn new(config: CacheConfig, cache: Arc<ResultCache>, resolver: R, fetcher: Arc<F>) -> Self {
        Self {
            config,
            cache,
            resolver,
            fetcher,
            counters: ImportCounters::default(),
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub async fn import_range(&self, domain: &str, key: &ImportKey, secret: &str) -> ImportOutcome {
        let error = match self.fetch_live(domain, key, secret).await {
            Ok((peer, range)) => {
                let reconciled = self
                    .cache
                    .reconcile_entry(key.clone(), range.values, range.write_time);
                self.counters.live_fetches.fetch_add(1, Ordering::Relaxed);
                if !reconciled.applied {
                    debug!(
                        %key,
                        %peer,
                        fetched = %range.write_time,
                        cached = %reconciled.entry.client_write_time,
                        "Fetched range is not newer than cached copy"
                    );
                }
                return ImportOutcome::Live {
                    peer,
                    applied: reconciled.applied,
                    entry: reconciled.entry,
                };
            }
            Err(e) => e,
        };

        match self.cache.lookup(key) {
            Some(entry) => {
                self.counters.cache_fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    %key,
                    domain,
                    error = %error,
                    write_time = %entry.client_write_time,
                    "Remote range unavailable, serving cached copy"
                );
                ImportOutcome::Cached(entry)
            }
            None => {
                self.counters.no_data.fetch_add(1, Ordering::Relaxed);
                warn!(%key, domain, error = %error, "Remote range unavailable and not cached");
                ImportOutcome::NoData
            }
        }
    }

    /// [`import_range`](Self::import_range) for a raw `"<sheetId>:<range>"` reference.
    pub async fn import_reference(
        &self,
        domain: &str,
        reference: &str,
        secret: &str,
    ) -> Result<ImportOutcome, CacheError> {
        let key = ImportKey::parse(reference)
            .ok_or_else(|| CacheError::InvalidImportKey(reference.to_string()))?;
        Ok(self.import_range(domain, &key, secret).await)
    }

    async fn fetch_live(
        &self,
        domain: &str,
        key: &ImportKey,
        secret: &str,
    ) -> Result<(ServiceUri, FetchedRange), CacheError> {
        let service = qualified_service_name(domain, &self.config.service_name);
        let peers = self.resolver.resolve(&service);
        let policy = self.config.retry_policy();

        let mut last_error = TransportError::Unreachable(format!("no peers known for {service}"));
        for peer in peers {
            let result = policy
                .run(|_| self.fetcher.fetch_range(&peer, key, secret))
                .await;
            match result {
                Ok(range) => return Ok((peer, range)),
                Err(e) => {
                    self.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
                    debug!(%peer, %key, error = %e, "Range fetch failed, trying next peer");
                    last_error = e;
                }
            }
        }
        Err(CacheError::FetchFailed(last_error))
    }

    /// Evict entries older than `max_entry_age_ms`. No-op when aging is off.
    pub fn evict_aged(&self) -> usize {
        let Some(max_age) = self.config.max_entry_age_ms else {
            return 0;
        };
        let cutoff = self.cache.now().saturating_sub_millis(max_age);
        let evicted = self.cache.evict_filled_before(cutoff);
        if evicted > 0 {
            self.counters
                .evicted
                .fetch_add(evicted as u64, Ordering::Relaxed);
            debug!(evicted, "Evicted aged cache entries");
        }
        evicted
    }

    pub fn metrics(&self) -> ImportMetrics {
        let c = &self.counters;
        ImportMetrics {
            live_fetches: c.live_fetches.load(Ordering::Relaxed),
            cache_fallbacks: c.cache_fallbacks.load(Ordering::Relaxed),
            no_data: c.no_data.load(Ordering::Relaxed),
            fetch_failures: c.fetch_failures.load(Ordering::Relaxed),
            evicted: c.evicted.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }
}

impl<R, F> ImportService<R, F>
where
    R: PeerResolver + 'static,
    F: RemoteRangeFetcher,
{
    /// Start the periodic aging sweep, if aging is configured.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        if self.config.max_entry_age_ms.is_none() {
            return None;
        }
        let service = Arc::clone(self);
        let period = Duration::from_millis(self.config.sweep_interval_ms.max(1));
        info!(period_ms = self.config.sweep_interval_ms, "Starting cache aging sweeper");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        service.evict_aged();
                    }
                }
                if *shutdown.borrow() {
                    break;
                }
            }
            debug!("Cache aging sweeper stopped");
        }))
    }
}

#[async_trait]
impl<R: PeerResolver, F: RemoteRangeFetcher> ImportApi for ImportService<R, F> {
    async fn import_range(&self, domain: &str, key: &ImportKey, secret: &str) -> ImportOutcome {
        ImportService::import_range(self, domain, key, secret).await
    }
}
