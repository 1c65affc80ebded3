//! Cross-domain import for the formula engine.
//!
//! Always answers 200 for a well-formed reference: an unreachable domain
//! yields the last known values, or `"source": "none"` when nothing was ever
//! fetched.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use shared_types::{CellGrid, WriteTime};
use ss_04_result_cache::{CacheError, ImportOutcome};

use super::{finish, Response};
use crate::adapters::PeerTransport;
use crate::container::NodeContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Live,
    Cached,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub source: ImportSource,
    pub values: Option<CellGrid>,
    pub write_time: Option<WriteTime>,
}

impl From<&ImportOutcome> for ImportResponse {
    fn from(outcome: &ImportOutcome) -> Self {
        let source = match outcome {
            ImportOutcome::Live { .. } => ImportSource::Live,
            ImportOutcome::Cached(_) => ImportSource::Cached,
            ImportOutcome::NoData => ImportSource::None,
        };
        let entry = outcome.entry();
        Self {
            source,
            values: entry.map(|e| e.values.as_ref().clone()),
            write_time: entry.map(|e| e.client_write_time),
        }
    }
}

pub struct ImportHandler<T: PeerTransport> {
    container: Arc<NodeContainer<T>>,
}

impl<T: PeerTransport> ImportHandler<T> {
    pub fn new(container: Arc<NodeContainer<T>>) -> Self {
        Self { container }
    }

    /// Import `reference` (`"<sheetId>:<range>"`) from `domain`.
    pub async fn import(&self, domain: &str, reference: &str) -> Response {
        let secret = &self.container.config.node.secret;
        let response = match self
            .container
            .imports
            .import_reference(domain, reference, secret)
            .await
        {
            Ok(outcome) => Response::json(&ImportResponse::from(&outcome)),
            Err(e @ CacheError::InvalidImportKey(_)) => Response::error(400, e.to_string()),
            Err(e) => Response::error(502, e.to_string()),
        };
        finish(&self.container, response)
    }
}
