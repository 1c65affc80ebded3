//! # Write Path
//!
//! ```text
//! request ──gate_write──┬─ Redirect  → 307 Location: primary + path?query
//!                       ├─ NoPrimary → 503
//!                       └─ Execute   → apply locally ─ error → 4xx, no version
//!                                           │
//!                                      next_version
//!                                           │
//!                                  propagate (first ack)
//!                                           │
//!                               204 + X-SHEETS-version
//! ```
//!
//! Local apply and version assignment happen under one lock so that version
//! order is apply order. Propagation runs outside it. The store records the
//! version with the change, the same value replicas record when they apply it.

use std::sync::Arc;
use tracing::{debug, warn};

use ss_02_replication::{SheetOperation, UpdateCellArgs};
use ss_03_primary_selector::{WriteDecision, WriteRequest};

use super::{finish, Response};
use crate::adapters::PeerTransport;
use crate::container::NodeContainer;

pub struct WriteHandler<T: PeerTransport> {
    container: Arc<NodeContainer<T>>,
}

impl<T: PeerTransport> WriteHandler<T> {
    pub fn new(container: Arc<NodeContainer<T>>) -> Self {
        Self { container }
    }

    pub async fn handle(&self, request: &WriteRequest, operation: SheetOperation) -> Response {
        let response = self.execute(request, operation).await;
        finish(&self.container, response)
    }

    async fn execute(&self, request: &WriteRequest, operation: SheetOperation) -> Response {
        match self.container.selector.gate_write(request) {
            WriteDecision::Execute => {}
            WriteDecision::Redirect { location } => {
                debug!(path = %request.path, %location, "Redirecting write to primary");
                return Response::redirect(location);
            }
            WriteDecision::NoPrimary => {
                warn!(path = %request.path, "Refusing write, no primary elected");
                return Response::error(503, "No primary elected for this domain");
            }
        }

        let encoded = match operation.encode() {
            Ok(encoded) => encoded,
            Err(e) => return Response::error(500, e.to_string()),
        };

        let version = {
            let _guard = self.container.write_lock.lock();
            // Versions are only issued under this lock.
            let version = self.container.coordinator.current_version().next();
            if let Err(e) = self.container.store.execute(&operation, version) {
                debug!(op = %operation.op_type(), error = %e, "Write rejected by store");
                return e.into();
            }
            self.container.coordinator.next_version()
        };

        let node = &self.container.config.node;
        let stats = self
            .container
            .coordinator
            .propagate(
                &encoded,
                version,
                &node.domain,
                &self.container.local_uri,
                &node.secret,
            )
            .await;
        debug!(
            op = %operation.op_type(),
            %version,
            peers = stats.peers_targeted,
            acked = stats.acknowledged(),
            "Write executed"
        );

        Response::no_content()
    }

    /// `PUT /spreadsheets/{sheetId}/{cell}?{query}`
    pub async fn update_cell(
        &self,
        sheet_id: &str,
        cell: &str,
        raw_value: &str,
        query: Option<String>,
    ) -> Response {
        let request = WriteRequest::new(format!("/spreadsheets/{sheet_id}/{cell}"), query);
        let operation = SheetOperation::UpdateCell(UpdateCellArgs {
            sheet_id: sheet_id.to_string(),
            cell: cell.to_string(),
            raw_value: raw_value.to_string(),
        });
        self.handle(&request, operation).await
    }
}
