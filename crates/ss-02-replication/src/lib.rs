//! # Replication Subsystem
//!
//! Total ordering and best-effort fan-out of spreadsheet mutations within a
//! domain.
//!
//! ## Roles
//!
//! - **Primary**: every accepted mutation takes the next version from a
//!   process-local counter, is encoded as `operationType\tjsonArgs` and pushed
//!   to every other instance. The caller is released on the first ack.
//! - **Replica**: incoming operations are applied strictly in version order;
//!   duplicates are dropped and gaps are waited for (bounded).
//!
//! Propagation is at-least-one-ack, not all-replicas: when `propagate` returns,
//! other replicas may still be behind.
//!
//! ## Architecture
//!
//! - **Domain Layer:** operation codec, `VersionCounter`, `ReorderBuffer`
//! - **Ports Layer:** `ReplicationApi` / `ReplicaApi` (inbound),
//!   `ReplicaTransport` / `OperationApplier` / `VersionStamped` / `PeerResolver` (outbound)
//! - **Service Layer:** `ReplicationCoordinator`, `ReplicaApplier`
//!
//! ## Example
//!
//! ```rust
//! use ss_02_replication::{SheetOperation, UpdateCellArgs, VersionCounter};
//!
//! let counter = VersionCounter::new();
//! let op = SheetOperation::UpdateCell(UpdateCellArgs {
//!     sheet_id: "S1".into(),
//!     cell: "A1".into(),
//!     raw_value: "42".into(),
//! });
//!
//! let encoded = op.encode().unwrap();
//! assert!(encoded.starts_with("updateCell\t"));
//! assert_eq!(counter.next().get(), 1);
//! ```

pub mod domain;
pub mod ports;
pub mod replica;
pub mod service;

pub use domain::{
    Admission, CoordinatorMetrics, OperationType, PropagationStats, ReorderBuffer, ReplicaMetrics,
    ReplicatedOperation, ReplicationConfig, ReplicationError, ShareArgs, SheetOperation, SheetRef,
    UpdateCellArgs, UserRef, VersionCounter,
};
pub use ports::{
    OperationApplier, PeerResolver, ReceiveOutcome, ReplicaApi, ReplicaTransport, ReplicationApi,
    VersionStamped,
};
pub use replica::ReplicaApplier;
pub use service::ReplicationCoordinator;
