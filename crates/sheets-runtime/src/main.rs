//! # Sheets Instance
//!
//! Entry point of one sheets server instance's coordination core.
//!
//! Configuration: `SS_CONFIG` names an optional TOML file; `SS_*` variables
//! override it (see `container::config`). Log level: `SS_LOG_LEVEL` or
//! `RUST_LOG`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use sheets_runtime::container::NodeConfig;
use sheets_runtime::{init_logging, SheetsRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let path = std::env::var_os("SS_CONFIG").map(PathBuf::from);
    let config = NodeConfig::load(path.as_deref()).context("Failed to load configuration")?;
    config
        .validate_for_production()
        .context("Configuration rejected")?;

    let runtime = SheetsRuntime::bind(config).await?;
    runtime.start();

    info!("Sheets instance is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
