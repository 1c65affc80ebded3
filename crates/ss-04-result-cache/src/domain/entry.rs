use shared_types::{CellGrid, Timestamp, WriteTime};
use std::sync::Arc;

/// Last known good values for one import key.
///
/// Entries are immutable; the cache swaps in a new `Arc<CacheEntry>` on every
/// change, so a reader always sees values and write-time that belong together.
/// The grid itself is shared between an entry and its touched copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub values: Arc<CellGrid>,
    /// Freshness of `values` as reported by the remote side.
    pub client_write_time: WriteTime,
    /// Last local write attempt on this key. Only used for aging.
    pub cache_fill_time: Timestamp,
}

impl CacheEntry {
    pub fn new(values: CellGrid, client_write_time: WriteTime, cache_fill_time: Timestamp) -> Self {
        Self {
            values: Arc::new(values),
            client_write_time,
            cache_fill_time,
        }
    }

    /// Copy of this entry with only the fill time moved.
    pub fn touched(&self, now: Timestamp) -> Self {
        Self {
            cache_fill_time: now,
            ..self.clone()
        }
    }
}
