//! Shootout Coordinator
//!
//! Owns the single shared [`ShootoutState`] behind one `RwLock` and exposes
//! the operations agents drive it with. Every read or write of the round
//! flag, the roster, the registration set and the winner slot goes through
//! this lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::game::roster::{Roster, RosterError, RosterSource};
use crate::game::shot::ShotOutcome;
use crate::game::state::{Participant, RoundStatus, ShootoutError, ShootoutState, ShotReport, Winner};
use crate::game::target::Selection;
use crate::network::protocol::TargetResponse;

/// Shared coordinator for one shootout.
pub struct Coordinator {
    /// Round state. One lock for every field.
    state: RwLock<ShootoutState>,
    /// Static roster, re-read on every reset.
    source: Box<dyn RosterSource>,
    /// Target selection randomness.
    rng: Mutex<StdRng>,
}

impl Coordinator {
    /// Load the roster from `source` and open round 1.
    pub fn new(source: impl RosterSource + 'static) -> Result<Self, RosterError> {
        Self::with_rng(source, StdRng::from_entropy())
    }

    /// Like [`Coordinator::new`] with seeded target selection.
    pub fn with_seed(source: impl RosterSource + 'static, seed: u64) -> Result<Self, RosterError> {
        Self::with_rng(source, StdRng::seed_from_u64(seed))
    }

    fn with_rng(source: impl RosterSource + 'static, rng: StdRng) -> Result<Self, RosterError> {
        let roster = Roster::load(&source)?;
        info!("Roster loaded with {} participants, waiting for registrations", roster.len());

        Ok(Self {
            state: RwLock::new(ShootoutState::new(roster)),
            source: Box::new(source),
            rng: Mutex::new(rng),
        })
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue the next identity of the current round.
    pub async fn register(&self) -> Result<Participant, ShootoutError> {
        let mut state = self.state.write().await;
        let registration = state.register()?;

        info!("Registered {} for round {}", registration.participant.name, state.round());
        if registration.activated {
            info!("All {} participants registered, round {} is active", state.roster().len(), state.round());
        }

        Ok(registration.participant)
    }

    /// Is shooting in progress?
    pub async fn is_active(&self) -> bool {
        self.state.read().await.is_active()
    }

    /// Pick an opponent for `requester`, or report the round's winner.
    ///
    /// If the requester turns out to be the last one alive, the round is
    /// concluded with the requester as winner and the roster reloaded.
    pub async fn select_target(&self, requester: &str) -> Result<TargetResponse, ShootoutError> {
        let selection = {
            let state = self.state.read().await;
            let mut rng = self.rng();
            state.select_target(requester, &mut *rng)?
        };

        match selection {
            Selection::Target(target) => {
                debug!("{} gets {} as target", requester, target.name);
                Ok(TargetResponse::target(target))
            }
            Selection::Winner(winner) => Ok(TargetResponse::winner(winner)),
            Selection::LoneSurvivor(_) => self.conclude_lone_survivor(requester).await,
        }
    }

    async fn conclude_lone_survivor(&self, requester: &str) -> Result<TargetResponse, ShootoutError> {
        let mut state = self.state.write().await;
        // re-select under the write lock, the round may have moved on
        let selection = state.select_target(requester, &mut *self.rng())?;

        match selection {
            Selection::LoneSurvivor(survivor) => {
                info!("Only {} is left standing", survivor.name);
                let next = Roster::load(self.source.as_ref())?;
                let winner = state.conclude(survivor, next);
                info!("Winner of round {} is {}, roster reloaded", winner.round, winner.participant.name);
                Ok(TargetResponse::winner(winner))
            }
            Selection::Winner(winner) => Ok(TargetResponse::winner(winner)),
            Selection::Target(target) => Ok(TargetResponse::target(target)),
        }
    }

    /// Commit an agent's shot report.
    ///
    /// Trust boundary: the reported health and alive flag are stored as-is;
    /// the coordinator never recomputes damage. Update, recount, winner
    /// declaration and roster reload happen under one write lock, so
    /// concurrent reports can never declare two winners.
    pub async fn commit_shot(&self, report: &ShotReport) -> Result<ShotOutcome, ShootoutError> {
        let mut state = self.state.write().await;
        let outcome = state.commit_shot(report, self.source.as_ref())?;

        if outcome.target.alive {
            debug!("{} was shot, health now {}", outcome.target.name, outcome.target.health);
        } else {
            info!("{} is dead, {} still alive", outcome.target.name, outcome.alive);
        }
        if let Some(winner) = &outcome.winner {
            info!(
                "Winner of round {} is {} with {} health, roster reloaded",
                winner.round, winner.participant.name, winner.participant.health
            );
        }

        Ok(outcome)
    }

    /// Winner of the last concluded round; `None` while a round is active.
    pub async fn current_winner(&self) -> Option<Winner> {
        self.state.read().await.current_winner().cloned()
    }

    /// Snapshot of the round.
    pub async fn status(&self) -> RoundStatus {
        self.state.read().await.status()
    }
}
