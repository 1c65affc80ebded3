//! `GET /spreadsheets/{sheetId}/{range}?secret=...` - range reads by other
//! domains. The write-time is the version of the last operation applied to
//! the sheet, so any instance of the domain reports the same write-time for
//! the same content and a lagging replica never reports a newer one.

use std::sync::Arc;

use shared_types::WriteTime;
use ss_04_result_cache::FetchedRange;

use super::{finish, Response};
use crate::adapters::PeerTransport;
use crate::container::NodeContainer;

pub struct RangeHandler<T: PeerTransport> {
    container: Arc<NodeContainer<T>>,
}

impl<T: PeerTransport> RangeHandler<T> {
    pub fn new(container: Arc<NodeContainer<T>>) -> Self {
        Self { container }
    }

    pub fn range(&self, sheet_id: &str, range: &str, secret: &str) -> Response {
        let response = if secret != self.container.config.node.secret {
            Response::forbidden()
        } else {
            match self.fetch(sheet_id, range) {
                Ok(fetched) => Response::json(&fetched),
                Err(response) => response,
            }
        };
        finish(&self.container, response)
    }

    fn fetch(&self, sheet_id: &str, range: &str) -> Result<FetchedRange, Response> {
        let store = &self.container.store;
        let sheet = store
            .get(sheet_id)
            .ok_or_else(|| Response::error(404, format!("Spreadsheet {sheet_id} does not exist")))?;
        let values = sheet
            .range_values(range)
            .ok_or_else(|| Response::error(400, format!("Invalid range {range}")))?;
        let write_time = store
            .write_version(sheet_id)
            .map(|v| WriteTime(v.get()))
            .unwrap_or_default();
        Ok(FetchedRange { values, write_time })
    }
}
