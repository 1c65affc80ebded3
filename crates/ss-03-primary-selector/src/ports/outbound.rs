//! # Driven Ports (Outbound SPI)

use shared_types::ServiceUri;

/// Invoked with the new primary (or `None` if leadership was lost).
pub type PrimaryChangeCallback = Box<dyn Fn(Option<ServiceUri>) + Send + Sync>;

/// External coordination service that knows the domain's primary.
///
/// Election itself is not performed here; the oracle only reports its result.
pub trait LeadershipOracle: Send + Sync {
    fn current_primary(&self) -> Option<ServiceUri>;

    /// Register a callback fired on every primary change. Callbacks must not
    /// register further callbacks.
    fn on_primary_change(&self, callback: PrimaryChangeCallback);
}
