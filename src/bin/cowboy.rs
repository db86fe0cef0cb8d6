//! Cowboy Agent
//!
//! Registers with the coordinator and shoots until a winner is declared.

use tracing::info;
use tracing_subscriber::EnvFilter;

use shootout::{Agent, AgentConfig, AgentOutcome, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AgentConfig::from_env();
    info!("Cowboy v{} reporting to {}", VERSION, config.server_url);

    match Agent::new(config).run().await? {
        AgentOutcome::Won(me) => info!("Oh yeah, {} won the shootout with {} health", me.name, me.health),
        AgentOutcome::Lost { winner } => info!("Oh no, {} won the shootout", winner.name),
    }

    Ok(())
}
