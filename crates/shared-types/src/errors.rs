//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Failure of an outbound call to a peer instance.
///
/// Shared by the replication transport and the remote range fetcher so that
/// retry policy can be decided in one place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connect or read deadline elapsed.
    #[error("Peer call timed out")]
    Timeout,

    /// Peer could not be reached at all.
    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    /// Peer answered with a non-success status.
    #[error("Peer rejected request with status {status}")]
    Rejected { status: u16 },

    /// Peer answered but the body could not be understood.
    #[error("Malformed peer response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Whether retrying the same call may succeed.
    ///
    /// Server-side 5xx answers count as transient; client errors and
    /// undecodable bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Unreachable(_) => true,
            Self::Rejected { status } => *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}
