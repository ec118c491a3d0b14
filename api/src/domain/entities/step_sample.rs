//! Step sample domain entity
//!
//! A raw step count reported by a provider for one time interval.
//! Samples are append-only: once accepted they are never modified.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Unique identifier for a stored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepSampleId(pub Uuid);

impl StepSampleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StepSampleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StepSampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// System that produced a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Apple Health
    Apple,
    /// Google Fit / Health Connect
    Google,
    /// Synthetic data from test clients
    Mock,
    /// First-party device
    Device,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Apple => write!(f, "apple"),
            Provider::Google => write!(f, "google"),
            Provider::Mock => write!(f, "mock"),
            Provider::Device => write!(f, "device"),
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apple" => Ok(Provider::Apple),
            "google" => Ok(Provider::Google),
            "mock" => Ok(Provider::Mock),
            "device" => Ok(Provider::Device),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// One sample as submitted by a client, before validation.
///
/// Every field is optional so that a malformed entry can be counted as
/// skipped instead of failing the whole upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleInput {
    pub external_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub steps: Option<i64>,
    pub source: Option<String>,
}

impl SampleInput {
    /// External id if present and non-blank
    pub fn dedup_key(&self) -> Option<&str> {
        self.external_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A persisted sample
#[derive(Debug, Clone, Serialize)]
pub struct StepSample {
    pub id: StepSampleId,
    pub user_id: UserId,
    pub provider: Provider,
    pub external_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub steps: i64,
    pub source: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Data needed to persist a validated sample
#[derive(Debug, Clone)]
pub struct NewStepSample {
    pub user_id: UserId,
    pub provider: Provider,
    pub external_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub steps: i64,
    pub source: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// A validated sample together with the local date its steps count towards
#[derive(Debug, Clone)]
pub struct DatedSample {
    pub sample: NewStepSample,
    pub local_date: NaiveDate,
}

/// Result of inserting a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(StepSampleId),
    /// Another sample already holds this (user, provider, external id)
    Duplicate,
}
