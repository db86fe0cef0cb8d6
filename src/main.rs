//! Shootout Coordinator Server
//!
//! Loads the roster and serves the coordinator over HTTP until ctrl-c.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shootout::{CoordinatorServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    info!("Shootout coordinator v{}", VERSION);
    info!("Roster: {}", config.roster_path.display());

    let server = Arc::new(
        CoordinatorServer::from_config(config.clone())
            .with_context(|| format!("failed to start with roster {}", config.roster_path.display()))?,
    );

    let signal_server = server.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_server.shutdown(),
            Err(err) => tracing::error!("Failed to listen for ctrl-c: {}", err),
        }
    });

    server.run().await?;
    info!("Coordinator stopped");
    Ok(())
}
