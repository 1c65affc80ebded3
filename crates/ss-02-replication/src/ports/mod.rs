//! # Ports Layer
//!
//! - **inbound**: `ReplicationApi` (primary side), `ReplicaApi` (replica side)
//! - **outbound**: `ReplicaTransport`, `OperationApplier`, `VersionStamped`, `PeerResolver`

pub mod inbound;
pub mod outbound;

pub use inbound::{ReceiveOutcome, ReplicaApi, ReplicationApi};
pub use outbound::{OperationApplier, PeerResolver, ReplicaTransport, VersionStamped};
