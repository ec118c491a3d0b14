//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod steps;

pub use steps::{daily, friends_leaderboard, group_leaderboard, history, upload};
