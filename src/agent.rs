//! Cowboy Agent
//!
//! The participant side of a shootout: register, wait for the round to
//! start, then shoot a random opponent every interval until the
//! coordinator names a winner.
//!
//! Agents compute the outcome of their own shots and report it; the
//! coordinator stores what it is told.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::env;
use crate::game::state::{Participant, ShotReport};
use crate::network::client::{ClientError, CoordinatorClient};
use crate::network::protocol::{ErrorCode, TargetResponse, WinnerResponse};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Coordinator base URL.
    pub server_url: String,
    /// Delay between shots.
    pub shot_interval: Duration,
    /// Delay between round-status polls.
    pub poll_interval: Duration,
    /// Delay before retrying a failed request.
    pub retry_backoff: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: "http://server:8080".to_string(),
            shot_interval: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl AgentConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_url: env::var_or("SHOOTOUT_SERVER_URL", defaults.server_url),
            shot_interval: env::millis_or("SHOOTOUT_SHOT_INTERVAL_MS", 1000),
            poll_interval: env::millis_or("SHOOTOUT_POLL_INTERVAL_MS", 1000),
            retry_backoff: env::millis_or("SHOOTOUT_RETRY_BACKOFF_MS", 1000),
        }
    }
}

// =============================================================================
// OUTCOME & ERRORS
// =============================================================================

/// How the shootout ended for this agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// This agent won; carries its final record.
    Won(Participant),
    /// Someone else won.
    Lost {
        /// The winner's record.
        winner: Participant,
    },
}

impl AgentOutcome {
    fn decide(me: &Participant, winner: Participant) -> Self {
        if winner.name == me.name {
            AgentOutcome::Won(winner)
        } else {
            AgentOutcome::Lost { winner }
        }
    }
}

/// Terminal agent failures.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Every identity of the round is taken.
    #[error("Registration closed, no identity available")]
    RegistrationClosed,

    /// The coordinator rejected a request in a way retrying cannot fix.
    #[error("Coordinator rejected request: {0}")]
    Rejected(#[from] ClientError),
}

/// Errors the agent logs and retries instead of giving up on.
fn is_transient(err: &ClientError) -> bool {
    match err {
        ClientError::Http(_) => true,
        ClientError::Rejected { code, .. } => matches!(
            code,
            None | Some(ErrorCode::RoundNotActive | ErrorCode::StaleReport | ErrorCode::ConfigLoad)
        ),
    }
}

// =============================================================================
// SHOOTING
// =============================================================================

/// Outcome of shooting `target` for `damage`.
pub fn shoot(target: &Participant, damage: u32) -> ShotReport {
    ShotReport::new(target.name.clone(), target.health.saturating_sub(damage))
}

// =============================================================================
// AGENT
// =============================================================================

/// One cowboy.
pub struct Agent {
    config: AgentConfig,
    client: CoordinatorClient,
}

impl Agent {
    /// Create an agent talking to `config.server_url`.
    pub fn new(config: AgentConfig) -> Self {
        let client = CoordinatorClient::new(config.server_url.clone());
        Self { config, client }
    }

    /// Agent configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Play one shootout to the end.
    pub async fn run(&self) -> Result<AgentOutcome, AgentError> {
        let me = self.register().await?;
        self.wait_for_start(&me).await;
        self.shoot_until_decided(&me).await
    }

    async fn register(&self) -> Result<Participant, AgentError> {
        loop {
            match self.client.register().await {
                Ok(me) => {
                    info!(
                        "I, {}, have registered with {} health and {} damage, waiting for signal to shoot",
                        me.name, me.health, me.damage
                    );
                    return Ok(me);
                }
                Err(err) if err.code() == Some(ErrorCode::RegistrationClosed) => {
                    return Err(AgentError::RegistrationClosed);
                }
                Err(err) => {
                    warn!("Registration failed, trying again: {}", err);
                    sleep(self.config.retry_backoff).await;
                }
            }
        }
    }

    async fn wait_for_start(&self, me: &Participant) {
        loop {
            match self.client.is_active().await {
                Ok(true) => {
                    info!("Shootout started, {} is drawing", me.name);
                    return;
                }
                Ok(false) => sleep(self.config.poll_interval).await,
                Err(err) => {
                    warn!("Round status check failed: {}", err);
                    sleep(self.config.retry_backoff).await;
                }
            }
        }
    }

    #[instrument(skip(self, me), fields(name = %me.name))]
    async fn shoot_until_decided(&self, me: &Participant) -> Result<AgentOutcome, AgentError> {
        loop {
            sleep(self.config.shot_interval).await;

            match self.fire(me).await {
                Ok(Some(outcome)) => {
                    match &outcome {
                        AgentOutcome::Won(_) => info!("I, {}, won the shootout", me.name),
                        AgentOutcome::Lost { winner } => info!("{} won, I'm dead", winner.name),
                    }
                    return Ok(outcome);
                }
                Ok(None) => {}
                Err(err) if is_transient(&err) => {
                    warn!("Shot failed, retrying: {}", err);
                    sleep(self.config.retry_backoff).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// One iteration: winner check, target, shot. `Some` once decided.
    async fn fire(&self, me: &Participant) -> Result<Option<AgentOutcome>, ClientError> {
        if let WinnerResponse { won: true, winner: Some(winner) } = self.client.winner().await? {
            return Ok(Some(AgentOutcome::decide(me, winner.participant)));
        }

        let TargetResponse { participant: target, won } = self.client.target(&me.name).await?;
        if won {
            debug!("Shootout is over");
            return Ok(Some(AgentOutcome::decide(me, target)));
        }

        let report = shoot(&target, me.damage);
        if report.alive {
            debug!("I, {}, just shot {}", me.name, target.name);
        } else {
            info!("I, {}, killed {}", me.name, target.name);
        }
        self.client.report_shot(&report).await?;

        Ok(None)
    }
}
