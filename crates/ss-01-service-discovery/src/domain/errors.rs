//! Domain Errors for Service Discovery

use thiserror::Error;

/// Errors that can occur during discovery operations.
///
/// None of these are fatal to the background loops; they are logged and the
/// loop continues with the next tick or datagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Datagram did not split into exactly `<serviceName>\t<serviceURI>`.
    #[error("Malformed announcement: expected 2 fields, got {fields}")]
    MalformedAnnouncement { fields: usize },

    /// One of the two fields was empty.
    #[error("Malformed announcement: empty field")]
    EmptyField,

    /// Datagram was not valid UTF-8.
    #[error("Announcement is not valid UTF-8")]
    InvalidEncoding,

    /// Socket could not be bound or joined to the multicast group.
    #[error("Failed to bind discovery socket: {0}")]
    Bind(String),

    /// Sending an announcement failed.
    #[error("Failed to send announcement: {0}")]
    Send(String),

    /// Receiving from the discovery channel failed.
    #[error("Failed to receive announcement: {0}")]
    Receive(String),
}
