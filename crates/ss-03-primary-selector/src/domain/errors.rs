use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The leadership oracle has not reported any primary yet.
    #[error("No primary instance is currently known")]
    NoPrimaryKnown,

    /// A write request target that is not an absolute path.
    #[error("Invalid request target: {0}")]
    InvalidRequestTarget(String),
}
