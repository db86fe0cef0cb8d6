//! # Shootout
//!
//! Coordinator and agents for a last-one-standing shootout.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SHOOTOUT                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/              - Round state machine (synchronous)      │
//! │  ├── state.rs       - Participants, round phase, winner      │
//! │  ├── roster.rs      - Roster store and roster sources        │
//! │  ├── registration.rs- Identity assignment                    │
//! │  ├── target.rs      - Opponent selection                     │
//! │  └── shot.rs        - Shot commits and win detection         │
//! │                                                              │
//! │  network/           - HTTP transport                         │
//! │  ├── coordinator.rs - Shared state behind one lock           │
//! │  ├── server.rs      - Axum routes                            │
//! │  ├── client.rs      - Reqwest client for agents              │
//! │  └── protocol.rs    - Wire types                             │
//! │                                                              │
//! │  agent.rs           - Cowboy control loop                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency
//!
//! All round state lives in one [`game::ShootoutState`] guarded by one
//! lock inside [`network::Coordinator`]:
//! - identities are issued at most once per round
//! - a shot's update, recount, winner declaration and roster reload are
//!   a single critical section
//! - exactly one winner is declared per round

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod agent;
pub mod game;
pub mod network;

mod env;

// Re-export commonly used types
pub use agent::{shoot, Agent, AgentConfig, AgentError, AgentOutcome};
pub use game::roster::{FileRosterSource, RosterError, RosterSource, StaticRosterSource};
pub use game::state::{Participant, RoundState, RoundStatus, ShootoutError, ShotReport, Winner};
pub use network::{Coordinator, CoordinatorClient, CoordinatorServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
