//! HTTP Coordinator Server
//!
//! Axum front-end for the [`Coordinator`]. Each request runs as its own
//! task; all shared state lives behind the coordinator's lock.
//!
//! | Method | Path       | Operation        |
//! |--------|------------|------------------|
//! | GET    | /register  | identity         |
//! | GET    | /start     | round active?    |
//! | GET    | /cowboys   | target (`?name`) |
//! | GET    | /winner    | winner query     |
//! | POST   | /update    | shot report      |
//! | GET    | /status    | round snapshot   |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::env;
use crate::game::roster::{FileRosterSource, RosterError};
use crate::game::state::{Participant, RoundStatus, ShootoutError, ShotReport};
use crate::network::coordinator::Coordinator;
use crate::network::protocol::{
    ErrorCode, ErrorResponse, StartResponse, TargetQuery, TargetResponse, WinnerResponse,
};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Roster file (JSON list of participants).
    pub roster_path: PathBuf,
    /// Seed for target selection; entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            roster_path: PathBuf::from("/config/config.json"),
            rng_seed: None,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env::var_or("SHOOTOUT_BIND_ADDR", defaults.bind_addr),
            roster_path: env::var_or("SHOOTOUT_ROSTER_PATH", defaults.roster_path),
            rng_seed: env::var_opt("SHOOTOUT_RNG_SEED"),
        }
    }
}

/// Coordinator server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind or serve.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Initial roster could not be loaded.
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

/// The coordinator server.
pub struct CoordinatorServer {
    /// Server configuration.
    config: ServerConfig,
    /// Shared shootout state.
    coordinator: Arc<Coordinator>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl CoordinatorServer {
    /// Create a server around an existing coordinator.
    pub fn new(config: ServerConfig, coordinator: Arc<Coordinator>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self { config, coordinator, shutdown_tx }
    }

    /// Load the roster file named in `config` and build the server.
    pub fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        let source = FileRosterSource::new(&config.roster_path);
        let coordinator = match config.rng_seed {
            Some(seed) => Coordinator::with_seed(source, seed)?,
            None => Coordinator::new(source)?,
        };
        Ok(Self::new(config, Arc::new(coordinator)))
    }

    /// Shared coordinator.
    pub fn coordinator(&self) -> Arc<Coordinator> {
        self.coordinator.clone()
    }

    /// HTTP routes.
    pub fn router(&self) -> Router {
        router(self.coordinator.clone())
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        info!("Shootout coordinator listening on {}", listener.local_addr()?);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                // a closed channel means the server handle is gone
                let _ = shutdown_rx.recv().await;
                info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send(()).is_err() {
            debug!("Shutdown requested but server is not running");
        }
    }
}

/// Build the router for `coordinator`.
pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/register", get(register_handler))
        .route("/start", get(start_handler))
        .route("/cowboys", get(target_handler))
        .route("/winner", get(winner_handler))
        .route("/update", post(update_handler))
        .route("/status", get(status_handler))
        .with_state(coordinator)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Error response with status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn status_for(code: ErrorCode) -> StatusCode {
        match code {
            ErrorCode::MissingName | ErrorCode::InvalidReport | ErrorCode::InvalidInput => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::UnknownParticipant => StatusCode::NOT_FOUND,
            ErrorCode::RegistrationClosed | ErrorCode::RoundNotActive | ErrorCode::StaleReport => {
                StatusCode::CONFLICT
            }
            ErrorCode::NoSurvivors | ErrorCode::ConfigLoad => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ShootoutError> for ApiError {
    fn from(err: ShootoutError) -> Self {
        let body = ErrorResponse::from(&err);
        let status = Self::status_for(body.code);
        if status.is_server_error() {
            warn!("Request failed: {}", err);
        } else {
            debug!("Request rejected: {}", err);
        }
        Self { status, body }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Invalid request body: {}", rejection);
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new(ErrorCode::InvalidInput, rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn register_handler(
    State(coordinator): State<Arc<Coordinator>>,
) -> Result<Json<Participant>, ApiError> {
    Ok(Json(coordinator.register().await?))
}

async fn start_handler(State(coordinator): State<Arc<Coordinator>>) -> Json<StartResponse> {
    Json(StartResponse { active: coordinator.is_active().await })
}

async fn target_handler(
    State(coordinator): State<Arc<Coordinator>>,
    Query(query): Query<TargetQuery>,
) -> Result<Json<TargetResponse>, ApiError> {
    Ok(Json(coordinator.select_target(&query.name).await?))
}

async fn winner_handler(State(coordinator): State<Arc<Coordinator>>) -> Json<WinnerResponse> {
    Json(WinnerResponse::from(coordinator.current_winner().await))
}

async fn update_handler(
    State(coordinator): State<Arc<Coordinator>>,
    body: Result<Json<ShotReport>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(report) = body?;
    debug!("{} got shot, updating health to {}", report.name, report.health);
    coordinator.commit_shot(&report).await?;
    Ok(StatusCode::OK)
}

async fn status_handler(State(coordinator): State<Arc<Coordinator>>) -> Json<RoundStatus> {
    Json(coordinator.status().await)
}
