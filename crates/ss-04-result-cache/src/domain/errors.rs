use shared_types::TransportError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Import reference not of the form `"<sheetId>:<range>"`.
    #[error("Invalid import key: {0}")]
    InvalidImportKey(String),

    /// Every resolved peer failed to serve the range.
    #[error("Remote fetch failed: {0}")]
    FetchFailed(#[from] TransportError),
}
