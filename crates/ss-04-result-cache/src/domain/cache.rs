//! # Result Cache
//!
//! Import key → last known good values, arbitrated by client write-time.
//!
//! ## Rules
//!
//! - A write to an existing key lands only if its write-time is strictly
//!   greater than the stored one. Reads per key are therefore monotonic.
//! - Every write attempt, landed or not, refreshes the entry's fill time.
//! - Fill time is used for aging only, never for arbitration.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use shared_types::{CellGrid, ImportKey, TimeSource, Timestamp, WriteTime};

use super::CacheEntry;

/// Outcome of a reconcile, with the entry as it stands afterwards.
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub applied: bool,
    pub entry: Arc<CacheEntry>,
}

pub struct ResultCache {
    entries: RwLock<HashMap<ImportKey, Arc<CacheEntry>>>,
    time_source: Arc<dyn TimeSource>,
}

impl ResultCache {
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            time_source,
        }
    }

    pub fn lookup(&self, key: &ImportKey) -> Option<Arc<CacheEntry>> {
        self.entries.read().get(key).cloned()
    }

    /// Create the entry if absent. Returns false (and changes nothing) if the
    /// key is already cached.
    pub fn insert(&self, key: ImportKey, values: CellGrid, client_write_time: WriteTime) -> bool {
        let now = self.time_source.now();
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(
            key,
            Arc::new(CacheEntry::new(values, client_write_time, now)),
        );
        true
    }

    /// Insert when absent, replace when strictly newer. Returns whether the
    /// values were applied.
    pub fn reconcile(&self, key: ImportKey, values: CellGrid, client_write_time: WriteTime) -> bool {
        self.reconcile_entry(key, values, client_write_time).applied
    }

    /// [`reconcile`](Self::reconcile), also returning the resulting entry
    /// under the same lock.
    pub fn reconcile_entry(
        &self,
        key: ImportKey,
        values: CellGrid,
        client_write_time: WriteTime,
    ) -> Reconciled {
        let now = self.time_source.now();
        let mut entries = self.entries.write();

        let (applied, entry) = match entries.get(&key) {
            Some(current) if client_write_time <= current.client_write_time => {
                (false, Arc::new(current.touched(now)))
            }
            _ => (true, Arc::new(CacheEntry::new(values, client_write_time, now))),
        };
        entries.insert(key, Arc::clone(&entry));
        Reconciled { applied, entry }
    }

    /// Drop entries whose last write attempt happened before `cutoff`.
    /// Returns the number removed.
    pub fn evict_filled_before(&self, cutoff: Timestamp) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.cache_fill_time >= cutoff);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn now(&self) -> Timestamp {
        self.time_source.now()
    }
}
