//! # Driving Ports (Inbound API)

use shared_types::ServiceUri;
use tokio::sync::watch;

use crate::domain::{Role, WriteDecision, WriteRequest};

pub trait PrimarySelectorApi: Send + Sync {
    /// Whether `uri` is the primary the oracle last reported.
    fn is_primary(&self, uri: &ServiceUri) -> bool;

    /// Whether this instance is the primary.
    fn is_local_primary(&self) -> bool;

    fn current_primary(&self) -> Option<ServiceUri>;

    /// Decide whether a mutating request runs here or goes to the primary.
    fn gate_write(&self, request: &WriteRequest) -> WriteDecision;

    fn role(&self) -> Role;

    /// Receiver that observes every role transition.
    fn subscribe_role(&self) -> watch::Receiver<Role>;
}
