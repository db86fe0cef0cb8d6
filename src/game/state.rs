//! Shootout State Definitions
//!
//! Participants, round phases and the shared state machine that every
//! coordinator operation runs against. Uses BTreeSet for deterministic
//! iteration order of the registration set.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::game::roster::{Roster, RosterError};

// =============================================================================
// PARTICIPANT
// =============================================================================

/// One combat entity (a cowboy).
///
/// Agents only ever receive copies; the authoritative record lives in the
/// coordinator's [`Roster`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Unique name, stable for the process lifetime.
    pub name: String,

    /// Remaining health. Never increases during a round.
    pub health: u32,

    /// Damage dealt per shot by this participant.
    pub damage: u32,

    /// Is the participant still standing?
    #[serde(rename = "is_alive")]
    pub alive: bool,
}

impl Participant {
    /// Create a participant; `alive` is derived from `health`.
    pub fn new(name: impl Into<String>, health: u32, damage: u32) -> Self {
        Self {
            name: name.into(),
            health,
            damage,
            alive: health > 0,
        }
    }

    /// Check `alive == (health > 0)`.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.alive == (self.health > 0)
    }
}

// =============================================================================
// SHOT REPORT
// =============================================================================

/// Outcome of a shot as computed by the shooting agent.
///
/// The coordinator stores these values as reported instead of recomputing
/// damage itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotReport {
    /// Name of the participant that was hit.
    pub name: String,

    /// Health of the target after the shot.
    pub health: u32,

    /// Whether the target survived the shot.
    #[serde(rename = "is_alive")]
    pub alive: bool,
}

impl ShotReport {
    /// Create a report for `name`; `alive` is derived from `health`.
    pub fn new(name: impl Into<String>, health: u32) -> Self {
        Self {
            name: name.into(),
            health,
            alive: health > 0,
        }
    }

    /// Check `alive == (health > 0)`.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.alive == (self.health > 0)
    }
}

// =============================================================================
// ROUND STATE
// =============================================================================

/// Phase of the current round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum RoundState {
    /// Handing out identities.
    #[default]
    Waiting,
    /// Every identity issued, shooting in progress.
    Active,
    /// A winner was declared and the roster reloaded for the next round.
    Concluded,
}

/// The last participant standing in a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// Record of the survivor at the moment the round concluded.
    #[serde(flatten)]
    pub participant: Participant,

    /// Round the participant won.
    pub round: u64,
}

/// Snapshot of the round for operators and tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStatus {
    /// Current round number (starts at 1).
    pub round: u64,
    /// Current phase.
    pub state: RoundState,
    /// Identities issued this round.
    pub registered: usize,
    /// Participants in the roster.
    pub roster_size: usize,
    /// Participants still alive.
    pub alive: usize,
    /// Winner currently held, if any.
    pub winner: Option<String>,
}

// =============================================================================
// SHOOTOUT STATE
// =============================================================================

/// Complete shared state of the shootout.
///
/// Roster, registration set, round phase and winner slot are owned together
/// so a single lock can guard every transition between them.
#[derive(Clone, Debug)]
pub struct ShootoutState {
    /// Authoritative roster for the current round.
    pub(crate) roster: Roster,

    /// Names that were issued an identity this round.
    pub(crate) registered: BTreeSet<String>,

    /// Current phase.
    pub(crate) round_state: RoundState,

    /// Winner of the last concluded round, until the next round starts.
    pub(crate) winner: Option<Winner>,

    /// Current round number.
    pub(crate) round: u64,
}

impl ShootoutState {
    /// Create the state for round 1 from a loaded roster.
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            registered: BTreeSet::new(),
            round_state: RoundState::Waiting,
            winner: None,
            round: 1,
        }
    }

    /// Current roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current phase.
    pub fn round_state(&self) -> RoundState {
        self.round_state
    }

    /// Current round number.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Is shooting in progress?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.round_state == RoundState::Active
    }

    /// Winner of the last concluded round.
    ///
    /// Always `None` while a round is active, even if an earlier round
    /// produced a winner.
    pub fn current_winner(&self) -> Option<&Winner> {
        if self.is_active() {
            return None;
        }
        self.winner.as_ref()
    }

    /// Names registered this round, in sorted order.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(String::as_str)
    }

    /// Snapshot the round.
    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            round: self.round,
            state: self.round_state,
            registered: self.registered.len(),
            roster_size: self.roster.len(),
            alive: self.roster.count_alive(),
            winner: self.winner.as_ref().map(|w| w.participant.name.clone()),
        }
    }

    /// Declare `survivor` the winner and swap in the roster for the next round.
    ///
    /// The winner record is captured before the old roster is dropped.
    pub(crate) fn conclude(&mut self, survivor: Participant, next_roster: Roster) -> Winner {
        let winner = Winner {
            participant: survivor,
            round: self.round,
        };
        self.winner = Some(winner.clone());
        self.round_state = RoundState::Concluded;
        self.roster = next_roster;
        self.registered.clear();
        self.round += 1;
        winner
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors reported by shootout operations.
///
/// Every variant is raised before any state is mutated.
#[derive(Debug, thiserror::Error)]
pub enum ShootoutError {
    /// Request carried no participant name.
    #[error("participant name is required")]
    MissingName,

    /// Name matches no roster entry.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// Every identity has already been issued this round.
    #[error("registration is closed")]
    RegistrationClosed,

    /// Operation requires an active round.
    #[error("round is not active")]
    RoundNotActive,

    /// Report violates `alive == (health > 0)`.
    #[error("invalid shot report for {name}: health {health} with is_alive={alive}")]
    InvalidReport {
        /// Target name.
        name: String,
        /// Reported health.
        health: u32,
        /// Reported alive flag.
        alive: bool,
    },

    /// Report would raise a participant's health.
    #[error("stale shot report for {name}: reported health {reported} above current {current}")]
    StaleReport {
        /// Target name.
        name: String,
        /// Health currently stored.
        current: u32,
        /// Health in the report.
        reported: u32,
    },

    /// Nobody in the roster is alive.
    #[error("no participant is alive")]
    NoSurvivors,

    /// Roster reload failed.
    #[error("roster reload failed: {0}")]
    ConfigLoad(#[from] RosterError),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cowboys() -> Roster {
        Roster::from_participants(vec![
            Participant::new("A", 100, 10),
            Participant::new("B", 100, 15),
        ])
        .unwrap()
    }

    #[test]
    fn test_participant_alive_derived_from_health() {
        assert!(Participant::new("A", 1, 10).alive);
        assert!(!Participant::new("A", 0, 10).alive);
        assert!(ShotReport::new("A", 5).is_consistent());
        assert!(!ShotReport::new("A", 0).alive);
    }

    #[test]
    fn test_participant_wire_names() {
        let json = serde_json::to_string(&Participant::new("Bill", 8, 1)).unwrap();
        assert_eq!(json, r#"{"name":"Bill","health":8,"damage":1,"is_alive":true}"#);

        let report: ShotReport =
            serde_json::from_str(r#"{"name":"Bill","health":0,"damage":1,"is_alive":false}"#).unwrap();
        assert_eq!(report, ShotReport::new("Bill", 0));
    }

    #[test]
    fn test_new_state_is_waiting() {
        let state = ShootoutState::new(two_cowboys());
        assert_eq!(state.round_state(), RoundState::Waiting);
        assert_eq!(state.round(), 1);
        assert!(state.current_winner().is_none());
        assert_eq!(state.status().alive, 2);
    }

    #[test]
    fn test_conclude_captures_winner_before_reload() {
        let mut state = ShootoutState::new(two_cowboys());
        state.round_state = RoundState::Active;
        state.registered.insert("A".into());
        state.registered.insert("B".into());

        let mut survivor = Participant::new("B", 100, 15);
        survivor.health = 7;
        let winner = state.conclude(survivor, two_cowboys());

        assert_eq!(winner.participant.health, 7);
        assert_eq!(winner.round, 1);
        assert_eq!(state.round_state(), RoundState::Concluded);
        assert_eq!(state.round(), 2);
        assert_eq!(state.registered().count(), 0);
        assert_eq!(state.roster().get("B").unwrap().health, 100);
        assert_eq!(state.current_winner(), Some(&winner));
    }

    #[test]
    fn test_winner_hidden_while_active() {
        let mut state = ShootoutState::new(two_cowboys());
        state.conclude(Participant::new("A", 3, 10), two_cowboys());
        state.round_state = RoundState::Active;
        assert!(state.current_winner().is_none());
    }
}
