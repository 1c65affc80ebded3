//! Replica-side ordering of incoming operations.
//!
//! Operations are released strictly in version order, starting right after
//! the primary's counter origin (the configured seed, zero by default). The
//! first version a primary issues is therefore expected even when a later one
//! arrives first.
//!
//! A replica that joins after the primary already issued versions holds back
//! what it receives until the buffer overflows, then skips the gap it will
//! never see.

use shared_types::Version;
use std::collections::BTreeMap;

use super::ReplicatedOperation;

/// What happened to an admitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Version already applied or already waiting.
    Duplicate,
    /// Held back until the missing version arrives.
    Buffered { waiting_for: Version },
    /// Operations to apply now, in order. `skipped` counts versions given up
    /// on because the buffer overflowed.
    Ready {
        operations: Vec<ReplicatedOperation>,
        skipped: u64,
    },
}

#[derive(Debug)]
pub struct ReorderBuffer {
    origin: Version,
    last_released: Option<Version>,
    pending: BTreeMap<Version, ReplicatedOperation>,
    capacity: usize,
}

impl ReorderBuffer {
    /// `capacity` bounds the number of operations held back; zero disables
    /// buffering (gaps are skipped immediately).
    pub fn new(capacity: usize) -> Self {
        Self::starting_after(Version::ZERO, capacity)
    }

    /// Buffer whose first expected version is `origin + 1`.
    pub fn starting_after(origin: Version, capacity: usize) -> Self {
        Self {
            origin,
            last_released: None,
            pending: BTreeMap::new(),
            capacity,
        }
    }

    pub fn last_released(&self) -> Option<Version> {
        self.last_released
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Next version the buffer is waiting for.
    pub fn expected(&self) -> Version {
        self.last_released.unwrap_or(self.origin).next()
    }

    pub fn admit(&mut self, operation: ReplicatedOperation) -> Admission {
        let version = operation.version;

        let expected = self.expected();

        if version < expected || self.pending.contains_key(&version) {
            return Admission::Duplicate;
        }

        if version == expected {
            self.last_released = Some(version);
            let mut operations = vec![operation];
            self.drain_contiguous(&mut operations);
            return Admission::Ready {
                operations,
                skipped: 0,
            };
        }

        self.pending.insert(version, operation);
        if self.pending.len() <= self.capacity {
            return Admission::Buffered {
                waiting_for: expected,
            };
        }

        // Overflow: give up on the gap and resume from the oldest held operation.
        let Some((oldest, operation)) = self.pending.pop_first() else {
            return Admission::Buffered {
                waiting_for: expected,
            };
        };
        let skipped = oldest.get() - expected.get();
        self.last_released = Some(oldest);
        let mut operations = vec![operation];
        self.drain_contiguous(&mut operations);
        Admission::Ready {
            operations,
            skipped,
        }
    }

    /// Go back to expecting `origin + 1` and drop everything held back.
    /// Returns the number of discarded operations.
    pub fn reset(&mut self) -> usize {
        self.last_released = None;
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    fn drain_contiguous(&mut self, out: &mut Vec<ReplicatedOperation>) {
        loop {
            let next = self.expected();
            match self.pending.remove(&next) {
                Some(operation) => {
                    self.last_released = Some(next);
                    out.push(operation);
                }
                None => break,
            }
        }
    }
}
