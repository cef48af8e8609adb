//! chatd - channel-based chat broker.

use anyhow::Context as _;
use chatd::config::Config;
use chatd::handlers::Registry;
use chatd::network::Gateway;
use chatd::state::Hub;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration. An explicit path must exist; the default path
    // falls back to built-in defaults when absent.
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to load config");
            e
        })?,
        None => Config::load_or_default("config.toml")?,
    };

    info!(
        address = %config.listen.address,
        upload_dir = %config.upload.dir.display(),
        "Starting chatd"
    );

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| {
            format!("creating upload directory {}", config.upload.dir.display())
        })?;

    let hub = Arc::new(Hub::new(&config));
    let registry = Arc::new(Registry::new());

    let gateway = Gateway::bind(&config, hub, registry).await?;
    gateway.run().await
}
