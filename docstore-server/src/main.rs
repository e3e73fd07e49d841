use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use docstore::docengine::DocStore;
use docstore::storage::log_cask::LogCask;
use docstore::storage::memory::Memory;
use docstore::storage::AnyEngine;

mod auth;
mod config;
mod error;
mod json_extractor;
mod logging_mw;
mod orchestration;
mod receiver;
mod replication;
mod routes;
mod state;
mod trace;

use config::ServerConfig;
use state::AppState;

const MEMORY_DATA_DIR: &str = ":memory:";
const LOG_FILE_NAME: &str = "docstore.log";

#[derive(Debug, Parser)]
#[command(author, version, about = "HTTP server for a replicated JSON document store")]
struct Args {
    /// Configuration file path.
    #[clap(short = 'c', long = "config", default_value = "config/docstore.yaml")]
    config: String,

    /// Directory the daily-rotating log files are written to.
    #[clap(long = "log-dir", default_value = "logs")]
    log_dir: String,

    #[clap(short = 'l', long = "log-level", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let args = Args::parse();
    let _guards = trace::init_logging(&args.log_dir, &args.log_level)?;
    info!("docstore-server starting with config {}", args.config);

    let cfg = ServerConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;

    let engine = open_engine(&cfg.data_dir)?;
    let store = DocStore::new(engine);
    let state = Arc::new(AppState::new(store, &cfg)?);

    let app = routes::router(state).layer(axum::middleware::from_fn(logging_mw::log_requests));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener =
        tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
    info!("docstore-server listening on {addr}, peers: {:?}", cfg.peers);

    axum::serve(listener, app).await.context("server exited unexpectedly")?;
    Ok(())
}

/// Picks the concrete KV engine for `data_dir`: the in-memory engine for the
/// sentinel `:memory:` path (tests, ephemeral nodes), otherwise the durable
/// log-structured engine rooted at `data_dir/docstore.log`.
fn open_engine(data_dir: &PathBuf) -> Result<AnyEngine> {
    if data_dir.as_os_str() == MEMORY_DATA_DIR {
        return Ok(AnyEngine::Memory(Memory::new()));
    }
    let log_path = data_dir.join(LOG_FILE_NAME);
    let cask = LogCask::new(log_path.clone())
        .with_context(|| format!("failed to open data directory at {}", log_path.display()))?;
    Ok(AnyEngine::LogCask(cask))
}
