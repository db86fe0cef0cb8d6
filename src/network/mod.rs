//! Network Layer
//!
//! HTTP transport for the shootout. The [`Coordinator`] owns the shared
//! state; `server` exposes it over axum and `client` is what agents use
//! to talk to it.

pub mod client;
pub mod coordinator;
pub mod protocol;
pub mod server;

pub use client::{ClientError, CoordinatorClient};
pub use coordinator::Coordinator;
pub use protocol::{
    ErrorCode, ErrorResponse, StartResponse, TargetQuery, TargetResponse, WinnerResponse,
};
pub use server::{router, CoordinatorServer, ServerConfig, ServerError};
