//! # Driving Ports (Inbound API)

use async_trait::async_trait;
use shared_types::ImportKey;

use crate::service::ImportOutcome;

#[async_trait]
pub trait ImportApi: Send + Sync {
    /// Values of `key` from `domain`, live if any peer answers, otherwise the
    /// last known good copy, otherwise [`ImportOutcome::NoData`].
    async fn import_range(&self, domain: &str, key: &ImportKey, secret: &str) -> ImportOutcome;
}
