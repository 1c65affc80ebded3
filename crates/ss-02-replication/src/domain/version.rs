//! Version counter of the domain's primary.

use shared_types::Version;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic, gap-free version source.
///
/// Only increments are serialized; callers run their operations concurrently.
/// The counter lives for the process: a restarted primary starts again from
/// its seed (zero by default).
#[derive(Debug, Default)]
pub struct VersionCounter {
    current: AtomicU64,
}

impl VersionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first issued version is `seed + 1`.
    pub fn starting_at(seed: Version) -> Self {
        Self {
            current: AtomicU64::new(seed.get()),
        }
    }

    /// Atomically advance and return the new version.
    pub fn next(&self) -> Version {
        Version(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Last version issued (zero if none).
    pub fn current(&self) -> Version {
        Version(self.current.load(Ordering::SeqCst))
    }
}
