//! Registration Gate
//!
//! Hands out roster identities exactly once per round and opens the round
//! when the last one is issued.

use crate::game::state::{Participant, RoundState, ShootoutError, ShootoutState};

/// Identity issued to a connecting agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Copy of the assigned participant.
    pub participant: Participant,
    /// This registration completed the roster and activated the round.
    pub activated: bool,
}

impl ShootoutState {
    /// Issue the first unregistered identity in declaration order.
    ///
    /// Scan and insert happen in one `&mut self` borrow, so callers holding
    /// the state's write lock can never hand the same identity out twice.
    /// The first registration after a concluded round opens the next one.
    pub fn register(&mut self) -> Result<Registration, ShootoutError> {
        if self.round_state == RoundState::Active {
            return Err(ShootoutError::RegistrationClosed);
        }

        let participant = self.roster.iter()
            .find(|p| !self.registered.contains(&p.name))
            .cloned()
            .ok_or(ShootoutError::RegistrationClosed)?;

        self.registered.insert(participant.name.clone());
        self.round_state = RoundState::Waiting;

        let activated = self.registration_full();
        if activated {
            self.round_state = RoundState::Active;
            self.winner = None;
        }

        Ok(Registration { participant, activated })
    }

    /// Have all identities been issued?
    pub fn registration_full(&self) -> bool {
        self.registered.len() == self.roster.len()
    }
}
