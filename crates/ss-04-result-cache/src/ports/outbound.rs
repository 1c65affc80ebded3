//! # Driven Ports (Outbound SPI)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{CellGrid, ImportKey, ServiceUri, TransportError, WriteTime};

pub use shared_types::{PeerResolver, TimeSource};

/// A range as served by the owning domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedRange {
    pub values: CellGrid,
    pub write_time: WriteTime,
}

/// Client that reads a cell range from a peer of another domain.
///
/// Production implementation:
/// `GET {peer}/spreadsheets/{sheetId}/{range}?secret=...`.
#[async_trait]
pub trait RemoteRangeFetcher: Send + Sync + 'static {
    async fn fetch_range(
        &self,
        peer: &ServiceUri,
        key: &ImportKey,
        secret: &str,
    ) -> Result<FetchedRange, TransportError>;
}
