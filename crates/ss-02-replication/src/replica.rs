//! # Replica Applier
//!
//! Replica-side intake of operations pushed by the primary. Decodes each
//! `(encoded, version)` pair, runs it through a [`ReorderBuffer`] and applies
//! whatever the buffer releases, in version order, through the
//! [`OperationApplier`] port.
//!
//! The buffer lock is held while applying so that two concurrent deliveries
//! cannot interleave their writes out of order.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

use shared_types::Version;

use crate::domain::{
    Admission, ReorderBuffer, ReplicaMetrics, ReplicatedOperation, ReplicationError,
};
use crate::ports::{OperationApplier, ReceiveOutcome, ReplicaApi};

#[derive(Debug, Default)]
struct ReplicaCounters {
    applied: AtomicU64,
    duplicates: AtomicU64,
    buffered: AtomicU64,
    skipped_versions: AtomicU64,
    rejected: AtomicU64,
}

pub struct ReplicaApplier<A: OperationApplier> {
    applier: A,
    buffer: Mutex<ReorderBuffer>,
    counters: ReplicaCounters,
}

impl<A: OperationApplier> ReplicaApplier<A> {
    pub fn new(applier: A, reorder_capacity: usize) -> Self {
        Self::starting_after(applier, Version::ZERO, reorder_capacity)
    }

    /// Replica of a primary whose counter is seeded at `origin`.
    pub fn starting_after(applier: A, origin: Version, reorder_capacity: usize) -> Self {
        Self {
            applier,
            buffer: Mutex::new(ReorderBuffer::starting_after(origin, reorder_capacity)),
            counters: ReplicaCounters::default(),
        }
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    pub fn receive(
        &self,
        encoded: &str,
        version: Version,
    ) -> Result<ReceiveOutcome, ReplicationError> {
        let operation = ReplicatedOperation::decode(encoded, version).inspect_err(|e| {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(%version, error = %e, "Rejected malformed replicated operation");
        })?;

        let mut buffer = self.buffer.lock();
        match buffer.admit(operation) {
            Admission::Duplicate => {
                self.counters.duplicates.fetch_add(1, Ordering::Relaxed);
                debug!(%version, "Ignoring duplicate replicated operation");
                Ok(ReceiveOutcome::Duplicate)
            }
            Admission::Buffered { waiting_for } => {
                self.counters.buffered.fetch_add(1, Ordering::Relaxed);
                debug!(%version, %waiting_for, "Holding back out-of-order operation");
                Ok(ReceiveOutcome::Buffered { waiting_for })
            }
            Admission::Ready {
                operations,
                skipped,
            } => {
                if skipped > 0 {
                    self.counters
                        .skipped_versions
                        .fetch_add(skipped, Ordering::Relaxed);
                    warn!(
                        skipped,
                        resume_at = %operations[0].version,
                        "Reorder buffer full, skipping missing versions"
                    );
                }

                let mut applied = 0;
                let mut failed = 0;
                for operation in &operations {
                    match self.applier.apply(operation) {
                        Ok(()) => applied += 1,
                        Err(reason) => {
                            failed += 1;
                            let error = ReplicationError::ApplyFailed {
                                version: operation.version.get(),
                                reason,
                            };
                            warn!(error = %error, "Replicated operation not applied");
                        }
                    }
                }
                drop(buffer);

                self.counters
                    .applied
                    .fetch_add(applied as u64, Ordering::Relaxed);
                self.counters
                    .rejected
                    .fetch_add(failed as u64, Ordering::Relaxed);
                Ok(ReceiveOutcome::Applied {
                    applied,
                    failed,
                    skipped,
                })
            }
        }
    }

    /// Drop ordering state and expect the first version of a fresh counter.
    pub fn reset(&self) {
        let dropped = self.buffer.lock().reset();
        info!(dropped, "Replica ordering state reset");
    }

    pub fn metrics(&self) -> ReplicaMetrics {
        let c = &self.counters;
        ReplicaMetrics {
            applied: c.applied.load(Ordering::Relaxed),
            duplicates: c.duplicates.load(Ordering::Relaxed),
            buffered: c.buffered.load(Ordering::Relaxed),
            skipped_versions: c.skipped_versions.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            last_applied: self.buffer.lock().last_released().map(Version::get),
        }
    }
}

impl<A: OperationApplier> ReplicaApi for ReplicaApplier<A> {
    fn receive(&self, encoded: &str, version: Version) -> Result<ReceiveOutcome, ReplicationError> {
        ReplicaApplier::receive(self, encoded, version)
    }

    fn reset(&self) {
        ReplicaApplier::reset(self)
    }
}
