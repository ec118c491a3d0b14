//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::{SampleInput, User, UserId};

/// Parse a `YYYY-MM-DD` date
pub fn date(raw: &str) -> NaiveDate {
    raw.parse().unwrap()
}

/// Parse an RFC 3339 instant
pub fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

/// Create a UTC user with a random id
pub fn test_user(username: &str) -> User {
    User {
        id: UserId::new(),
        username: username.to_string(),
        timezone: None,
    }
}

/// Create a user with a configured zone
pub fn test_user_in_zone(username: &str, timezone: &str) -> User {
    User {
        timezone: Some(timezone.to_string()),
        ..test_user(username)
    }
}

/// Create a user with a fixed id, for ordering assertions
pub fn test_user_with_id(username: &str, id: Uuid) -> User {
    User {
        id: UserId(id),
        ..test_user(username)
    }
}

/// A valid sample without an external id
pub fn sample(steps: i64, started_at: &str, ended_at: &str) -> SampleInput {
    SampleInput {
        external_id: None,
        started_at: Some(ts(started_at)),
        ended_at: Some(ts(ended_at)),
        steps: Some(steps),
        source: None,
    }
}

/// A valid sample carrying an external id
pub fn sample_with_id(external_id: &str, steps: i64, started_at: &str, ended_at: &str) -> SampleInput {
    SampleInput {
        external_id: Some(external_id.to_string()),
        ..sample(steps, started_at, ended_at)
    }
}
