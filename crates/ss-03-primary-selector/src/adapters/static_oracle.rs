//! Leadership oracle whose primary is set by hand.
//!
//! Used when the primary is configured statically, and by tests that need to
//! drive leadership changes.

use parking_lot::RwLock;
use shared_types::ServiceUri;
use tracing::debug;

use crate::ports::{LeadershipOracle, PrimaryChangeCallback};

#[derive(Default)]
pub struct StaticLeadershipOracle {
    primary: RwLock<Option<ServiceUri>>,
    callbacks: RwLock<Vec<PrimaryChangeCallback>>,
}

impl StaticLeadershipOracle {
    pub fn new(primary: Option<ServiceUri>) -> Self {
        Self {
            primary: RwLock::new(primary),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Oracle that has not elected anyone yet.
    pub fn unelected() -> Self {
        Self::default()
    }

    /// Make `uri` the primary. Returns false (and notifies nobody) if it
    /// already was.
    pub fn elect(&self, uri: ServiceUri) -> bool {
        self.set(Some(uri))
    }

    /// Forget the primary.
    pub fn clear(&self) -> bool {
        self.set(None)
    }

    fn set(&self, primary: Option<ServiceUri>) -> bool {
        {
            let mut current = self.primary.write();
            if *current == primary {
                return false;
            }
            *current = primary.clone();
        }

        let callbacks = self.callbacks.read();
        debug!(primary = ?primary, listeners = callbacks.len(), "Primary changed");
        for callback in callbacks.iter() {
            callback(primary.clone());
        }
        true
    }
}

impl LeadershipOracle for StaticLeadershipOracle {
    fn current_primary(&self) -> Option<ServiceUri> {
        self.primary.read().clone()
    }

    fn on_primary_change(&self, callback: PrimaryChangeCallback) {
        self.callbacks.write().push(callback);
    }
}
