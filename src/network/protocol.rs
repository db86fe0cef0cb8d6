//! Protocol Messages
//!
//! Wire format for agent-coordinator communication over HTTP.
//! All bodies are JSON; participant fields keep the names agents already
//! speak (`name`, `health`, `damage`, `is_alive`).

use serde::{Serialize, Deserialize};

use crate::game::state::{Participant, ShootoutError, Winner};

// =============================================================================
// AGENT -> COORDINATOR
// =============================================================================

/// Query string of the target endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetQuery {
    /// Name of the requesting participant.
    #[serde(default)]
    pub name: String,
}

pub use crate::game::state::ShotReport;

// =============================================================================
// COORDINATOR -> AGENT
// =============================================================================

/// Round-status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    /// Shooting may begin.
    pub active: bool,
}

/// Target endpoint response.
///
/// A record with `won` set is the winner of a concluded round rather than
/// an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetResponse {
    /// Chosen target, or the winner.
    #[serde(flatten)]
    pub participant: Participant,
    /// The round is over and `participant` won it.
    #[serde(default)]
    pub won: bool,
}

impl TargetResponse {
    /// An opponent to shoot.
    pub fn target(participant: Participant) -> Self {
        Self { participant, won: false }
    }

    /// The winner of the round.
    pub fn winner(winner: Winner) -> Self {
        Self { participant: winner.participant, won: true }
    }
}

/// Winner-query response: `{"won": false}` or the winner record with
/// `"won": true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerResponse {
    /// A winner is held.
    pub won: bool,
    /// The winner record.
    #[serde(flatten)]
    pub winner: Option<Winner>,
}

impl From<Option<Winner>> for WinnerResponse {
    fn from(winner: Option<Winner>) -> Self {
        Self { won: winner.is_some(), winner }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request carried no participant name.
    MissingName,
    /// Name matches no roster entry.
    UnknownParticipant,
    /// Every identity has been issued.
    RegistrationClosed,
    /// Round is not active.
    RoundNotActive,
    /// Shot report is self-contradictory.
    InvalidReport,
    /// Shot report would raise health.
    StaleReport,
    /// Nobody is alive.
    NoSurvivors,
    /// Roster could not be reloaded.
    ConfigLoad,
    /// Body or query could not be parsed.
    InvalidInput,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    /// Create an error body.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<&ShootoutError> for ErrorCode {
    fn from(err: &ShootoutError) -> Self {
        match err {
            ShootoutError::MissingName => ErrorCode::MissingName,
            ShootoutError::UnknownParticipant(_) => ErrorCode::UnknownParticipant,
            ShootoutError::RegistrationClosed => ErrorCode::RegistrationClosed,
            ShootoutError::RoundNotActive => ErrorCode::RoundNotActive,
            ShootoutError::InvalidReport { .. } => ErrorCode::InvalidReport,
            ShootoutError::StaleReport { .. } => ErrorCode::StaleReport,
            ShootoutError::NoSurvivors => ErrorCode::NoSurvivors,
            ShootoutError::ConfigLoad(_) => ErrorCode::ConfigLoad,
        }
    }
}

impl From<&ShootoutError> for ErrorResponse {
    fn from(err: &ShootoutError) -> Self {
        Self::new(ErrorCode::from(err), err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
