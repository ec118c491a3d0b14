//! Authentication
//!
//! Identity comes from the upstream auth gateway.

mod gateway;

pub use gateway::auth_middleware;
