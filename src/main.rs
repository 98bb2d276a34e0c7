//! Headless match-3 runner (default binary).
//!
//! Reads JSON commands from stdin, one per line, and writes board events to
//! stdout. Logs go to stderr; filter them with `RUST_LOG`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use match3::adapter::{run, AdapterConfig, LevelController};
use match3::engine::EngineConfig;
use match3::store::{LevelStore, StoreConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let store_config = StoreConfig::from_env();
    tracing::info!(
        levels = %store_config.levels_dir.display(),
        saves = %store_config.save_dir.display(),
        "opening level store"
    );
    let store = Arc::new(LevelStore::open(store_config));

    let controller = LevelController::start(store, EngineConfig::from_env(), AdapterConfig::from_env().viewport())
        .await
        .context("starting first level")?;

    run(controller, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}
