//! Test utilities for service discovery.
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use ss_01_service_discovery::test_utils::ControllableTimeSource;
//! use ss_01_service_discovery::TimeSource;
//!
//! let time = ControllableTimeSource::new(1_000);
//! time.advance(500);
//! assert_eq!(time.now().as_millis(), 1_500);
//! ```

use shared_types::{TimeSource, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe time source whose clock only moves when told to.
#[derive(Debug, Default)]
pub struct ControllableTimeSource {
    millis: AtomicU64,
}

impl ControllableTimeSource {
    pub fn new(initial_millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(initial_millis),
        }
    }

    /// Advance the clock by `millis`.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ControllableTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}
