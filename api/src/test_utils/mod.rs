//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - mockall has lifetime issues with traits containing `&str` parameters
//! - The in-memory stores enforce the same uniqueness and atomicity the
//!   database does, which service tests rely on

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
