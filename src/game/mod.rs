//! Shootout Logic Module
//!
//! The coordinator's state machine. Synchronous and lock-free on its own;
//! the network layer wraps [`ShootoutState`] in a single lock.
//!
//! ## Module Structure
//!
//! - `state`: Participants, round phases, winner slot, errors
//! - `roster`: Roster store and roster sources
//! - `registration`: Identity assignment and round activation
//! - `target`: Opponent selection
//! - `shot`: Shot commits, win detection and round reset

pub mod state;
pub mod roster;
pub mod registration;
pub mod target;
pub mod shot;

// Re-export key types
pub use state::{Participant, ShotReport, RoundState, RoundStatus, Winner, ShootoutState, ShootoutError};
pub use roster::{Roster, RosterSource, FileRosterSource, StaticRosterSource, RosterError};
pub use registration::Registration;
pub use target::Selection;
pub use shot::ShotOutcome;
