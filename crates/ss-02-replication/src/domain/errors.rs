use thiserror::Error;

/// Replication errors.
///
/// Only replica-side decoding and applying can fail; propagation itself never
/// surfaces an error to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    #[error("Malformed operation encoding: {0}")]
    MalformedOperation(String),

    #[error("Unknown operation type: {0}")]
    UnknownOperationType(String),

    #[error("Invalid operation arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to serialize operation arguments: {0}")]
    Serialization(String),

    #[error("Failed to apply operation at version {version}: {reason}")]
    ApplyFailed { version: u64, reason: String },
}
