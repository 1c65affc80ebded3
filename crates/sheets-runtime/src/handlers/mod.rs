//! # Request Handlers
//!
//! Framework-agnostic handlers for the requests the coordination core takes
//! part in. The inbound HTTP layer parses the request, calls the handler and
//! writes the returned [`Response`] back verbatim.
//!
//! - `WriteHandler` - mutating requests: gate, apply, version, propagate
//! - `ReplicaHandler` - `POST /replication/ops` from the primary
//! - `RangeHandler` - `GET /spreadsheets/{sheetId}/{range}` for other domains
//! - `ImportHandler` - cross-domain import with cache fallback
//!
//! Every response leaves through [`finish`], which stamps the domain version
//! on anything the primary sends out.

pub mod import;
pub mod range;
pub mod replica;
pub mod write;

pub use import::{ImportHandler, ImportResponse, ImportSource};
pub use range::RangeHandler;
pub use replica::ReplicaHandler;
pub use write::WriteHandler;

use serde::Serialize;
use std::collections::BTreeMap;

use ss_02_replication::VersionStamped;

use crate::adapters::{PeerTransport, StoreError};
use crate::container::NodeContainer;

pub const LOCATION_HEADER: &str = "Location";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn no_content() -> Self {
        Self::new(204)
    }

    pub fn json<B: Serialize>(body: &B) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => {
                let mut response = Self::new(200);
                response
                    .headers
                    .insert("Content-Type".to_string(), "application/json".to_string());
                response.body = Some(body);
                response
            }
            Err(e) => Self::error(500, format!("Failed to encode response: {e}")),
        }
    }

    /// Temporary redirect; the client repeats the same method on `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        let mut response = Self::new(307);
        response
            .headers
            .insert(LOCATION_HEADER.to_string(), location.into());
        response
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            body: Some(message.into()),
            ..Self::new(status)
        }
    }

    pub fn forbidden() -> Self {
        Self::error(403, "Invalid secret")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<StoreError> for Response {
    fn from(error: StoreError) -> Self {
        let status = match &error {
            StoreError::SheetNotFound(_) => 404,
            StoreError::SheetExists(_) => 409,
            StoreError::InvalidCell { .. } | StoreError::MalformedSheet { .. } => 400,
        };
        Self::error(status, error.to_string())
    }
}

impl VersionStamped for Response {
    fn insert_header(&mut self, name: &str, value: String) {
        self.headers.insert(name.to_string(), value);
    }
}

/// Outbound filter shared by all handlers: on the primary, attach the current
/// version header whatever the status.
pub(crate) fn finish<T: PeerTransport>(container: &NodeContainer<T>, mut response: Response) -> Response {
    if container.selector.is_local_primary() {
        container.coordinator.stamp_response(&mut response);
    }
    response
}
