//! `POST /replication/ops?secret=...` - operations pushed by the primary.

use std::sync::Arc;
use tracing::{debug, warn};

use shared_types::Version;
use ss_02_replication::ReceiveOutcome;

use super::{finish, Response};
use crate::adapters::PeerTransport;
use crate::container::NodeContainer;

pub struct ReplicaHandler<T: PeerTransport> {
    container: Arc<NodeContainer<T>>,
}

impl<T: PeerTransport> ReplicaHandler<T> {
    pub fn new(container: Arc<NodeContainer<T>>) -> Self {
        Self { container }
    }

    /// Any 2xx acknowledges the operation to the sender.
    pub fn receive(&self, secret: &str, version_header: Option<&str>, body: &str) -> Response {
        finish(&self.container, self.apply(secret, version_header, body))
    }

    fn apply(&self, secret: &str, version_header: Option<&str>, body: &str) -> Response {
        if secret != self.container.config.node.secret {
            warn!("Rejected replicated operation with invalid secret");
            return Response::forbidden();
        }

        let Some(version) = version_header.and_then(|v| v.trim().parse::<u64>().ok()) else {
            return Response::error(400, "Missing or invalid version header");
        };

        if self.container.selector.is_local_primary() {
            warn!(version, "Primary received a replicated operation, ignoring");
            return Response::error(409, "This instance is the primary");
        }

        match self.container.replica.receive(body, Version(version)) {
            Ok(outcome) => {
                if let ReceiveOutcome::Applied { failed, .. } = outcome {
                    if failed > 0 {
                        debug!(version, failed, "Some released operations were not applied");
                    }
                }
                Response::no_content()
            }
            Err(e) => Response::error(400, e.to_string()),
        }
    }
}
