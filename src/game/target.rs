//! Target Selector
//!
//! Picks a living opponent for a requesting participant, or recognises
//! that the requester is the last one standing.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::game::state::{Participant, ShootoutError, ShootoutState, Winner};

/// Result of a target request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Opponent to shoot.
    Target(Participant),
    /// Round is over; this is its winner.
    Winner(Winner),
    /// Only this participant is alive. The caller must conclude the round.
    LoneSurvivor(Participant),
}

impl ShootoutState {
    /// Pick a uniformly random alive opponent for `requester`.
    ///
    /// When nobody but the requester could be chosen the alive set is
    /// recomputed without the exclusion, to tell a lone survivor apart
    /// from an empty battlefield.
    pub fn select_target<R: Rng + ?Sized>(
        &self,
        requester: &str,
        rng: &mut R,
    ) -> Result<Selection, ShootoutError> {
        if requester.is_empty() {
            return Err(ShootoutError::MissingName);
        }

        if !self.is_active() {
            return match &self.winner {
                Some(winner) => Ok(Selection::Winner(winner.clone())),
                None => Err(ShootoutError::RoundNotActive),
            };
        }

        if self.roster.get(requester).is_none() {
            return Err(ShootoutError::UnknownParticipant(requester.to_string()));
        }

        let candidates = self.roster.list_alive(requester);
        if let Some(target) = candidates.choose(rng) {
            return Ok(Selection::Target(target.clone()));
        }

        let mut survivors = self.roster.alive();
        match (survivors.next(), survivors.next()) {
            (Some(only), None) => Ok(Selection::LoneSurvivor(only.clone())),
            _ => Err(ShootoutError::NoSurvivors),
        }
    }
}
