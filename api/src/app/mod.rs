//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and ports.

pub mod history_service;
pub mod ingestion_service;
pub mod leaderboard_service;
pub mod local_date;
pub mod steps_config;
pub mod users;

pub use history_service::HistoryService;
pub use ingestion_service::{IngestionService, UploadSummary};
pub use leaderboard_service::LeaderboardService;
pub use users::require_user;
