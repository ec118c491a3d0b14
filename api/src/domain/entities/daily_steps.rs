//! Daily step aggregate
//!
//! One running total per user per local calendar date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::user::UserId;

/// Cumulative step total for one user on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySteps {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub steps_total: i64,
    pub updated_at: DateTime<Utc>,
}

/// One row of a ranked leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total: i64,
}
