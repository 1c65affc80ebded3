//! # Result Cache Subsystem
//!
//! Freshness-aware cache for cross-domain range imports. Values fetched from
//! another domain are stored with the write-time the remote side reported;
//! when the remote side is unreachable the last known good values are served.
//!
//! ## Architecture
//!
//! - **Domain Layer:** `ResultCache` (write-time arbitration, aging), `CacheEntry`
//! - **Ports Layer:** `ImportApi` (inbound), `RemoteRangeFetcher` / `PeerResolver` (outbound)
//! - **Service Layer:** `ImportService` (live fetch, reconcile, fallback)
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ss_04_result_cache::{ImportKey, ResultCache, WriteTime};
//! use shared_types::SystemTimeSource;
//!
//! let cache = ResultCache::new(Arc::new(SystemTimeSource::new()));
//! let key = ImportKey::parse("S1:A1:B2").unwrap();
//!
//! assert!(cache.reconcile(key.clone(), vec![vec!["new".into()]], WriteTime(100)));
//! assert!(!cache.reconcile(key.clone(), vec![vec!["old".into()]], WriteTime(90)));
//! assert_eq!(*cache.lookup(&key).unwrap().values, vec![vec!["new".to_string()]]);
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{CacheConfig, CacheEntry, CacheError, Reconciled, ResultCache};
pub use ports::{FetchedRange, ImportApi, PeerResolver, RemoteRangeFetcher, TimeSource};
pub use service::{ImportMetrics, ImportOutcome, ImportService};
pub use shared_types::{CellGrid, ImportKey, WriteTime};
