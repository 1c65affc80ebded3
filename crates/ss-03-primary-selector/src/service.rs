//! # Primary Selector
//!
//! Keeps a cached pointer to the domain's primary, fed by the leadership
//! oracle's change notifications, and answers the write-path question "run it
//! here or redirect?".
//!
//! ## State Machine
//!
//! ```text
//!   Replica ──(oracle names local URI)──→ Primary
//!   Primary ──(oracle names another / none)──→ Replica
//! ```
//!
//! Transitions only happen on oracle notifications; there is no timeout-based
//! self-promotion. In-flight requests keep the decision they were given.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use shared_types::ServiceUri;

use crate::domain::{redirect_location, Role, WriteDecision, WriteRequest};
use crate::ports::{LeadershipOracle, PrimarySelectorApi};

struct SelectorState {
    local_uri: ServiceUri,
    primary: RwLock<Option<ServiceUri>>,
    role_tx: watch::Sender<Role>,
    primary_tx: watch::Sender<Option<ServiceUri>>,
    transitions: AtomicU64,
}

impl SelectorState {
    fn apply(&self, primary: Option<ServiceUri>) {
        let previous = std::mem::replace(&mut *self.primary.write(), primary.clone());
        if previous == primary {
            return;
        }

        let role = Role::for_instance(&self.local_uri, primary.as_ref());
        let previous_role = self.role_tx.send_replace(role);
        self.primary_tx.send_replace(primary.clone());

        if role != previous_role {
            self.transitions.fetch_add(1, Ordering::Relaxed);
            info!(
                from = %previous_role,
                to = %role,
                primary = ?primary,
                "Instance role changed"
            );
        } else {
            info!(previous = ?previous, primary = ?primary, %role, "Domain primary changed");
        }
    }
}

pub struct PrimarySelector {
    state: Arc<SelectorState>,
}

impl PrimarySelector {
    /// Attach to `oracle` and start tracking its primary.
    pub fn new(local_uri: ServiceUri, oracle: &dyn LeadershipOracle) -> Self {
        let initial = oracle.current_primary();
        let role = Role::for_instance(&local_uri, initial.as_ref());
        let (role_tx, _) = watch::channel(role);
        let (primary_tx, _) = watch::channel(initial.clone());

        let state = Arc::new(SelectorState {
            local_uri,
            primary: RwLock::new(initial),
            role_tx,
            primary_tx,
            transitions: AtomicU64::new(0),
        });

        let weak = Arc::downgrade(&state);
        oracle.on_primary_change(Box::new(move |primary| {
            if let Some(state) = weak.upgrade() {
                state.apply(primary);
            }
        }));
        // Catch a change that landed between the first read and registration.
        state.apply(oracle.current_primary());

        let selector = Self { state };
        info!(
            local = %selector.local_uri(),
            role = %selector.role(),
            primary = ?selector.current_primary(),
            "Primary selector attached to leadership oracle"
        );
        selector
    }

    pub fn local_uri(&self) -> &ServiceUri {
        &self.state.local_uri
    }

    pub fn is_primary(&self, uri: &ServiceUri) -> bool {
        self.state.primary.read().as_ref() == Some(uri)
    }

    pub fn is_local_primary(&self) -> bool {
        self.is_primary(&self.state.local_uri)
    }

    pub fn current_primary(&self) -> Option<ServiceUri> {
        self.state.primary.read().clone()
    }

    pub fn role(&self) -> Role {
        *self.state.role_tx.borrow()
    }

    pub fn gate_write(&self, request: &WriteRequest) -> WriteDecision {
        let primary = self.state.primary.read();
        match primary.as_ref() {
            None => {
                debug!(path = %request.path, "Write refused, no primary known");
                WriteDecision::NoPrimary
            }
            Some(primary) if *primary == self.state.local_uri => WriteDecision::Execute,
            Some(primary) => {
                let location = redirect_location(primary, request);
                debug!(path = %request.path, %location, "Redirecting write to primary");
                WriteDecision::Redirect { location }
            }
        }
    }

    pub fn subscribe_role(&self) -> watch::Receiver<Role> {
        self.state.role_tx.subscribe()
    }

    /// Receiver that observes every primary change, including changes that
    /// leave this instance's role untouched.
    pub fn subscribe_primary(&self) -> watch::Receiver<Option<ServiceUri>> {
        self.state.primary_tx.subscribe()
    }

    /// Number of role transitions since construction.
    pub fn transitions(&self) -> u64 {
        self.state.transitions.load(Ordering::Relaxed)
    }
}

impl PrimarySelectorApi for PrimarySelector {
    fn is_primary(&self, uri: &ServiceUri) -> bool {
        PrimarySelector::is_primary(self, uri)
    }

    fn is_local_primary(&self) -> bool {
        PrimarySelector::is_local_primary(self)
    }

    fn current_primary(&self) -> Option<ServiceUri> {
        PrimarySelector::current_primary(self)
    }

    fn gate_write(&self, request: &WriteRequest) -> WriteDecision {
        PrimarySelector::gate_write(self, request)
    }

    fn role(&self) -> Role {
        PrimarySelector::role(self)
    }

    fn subscribe_role(&self) -> watch::Receiver<Role> {
        PrimarySelector::subscribe_role(self)
    }
}
