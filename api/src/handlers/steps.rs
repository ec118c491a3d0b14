//! Step handlers
//!
//! Upload, history and leaderboard endpoints under `/api/steps`.
//! The authenticated `User` is injected by the auth middleware.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::local_date::UserZone;
use crate::app::steps_config::{DEFAULT_HISTORY_DAYS, DEFAULT_LEADERBOARD_LIMIT};
use crate::app::UploadSummary;
use crate::domain::entities::{DailySteps, GroupId, LeaderboardEntry, SampleInput, User};
use crate::error::AppError;
use crate::AppState;

const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// ============================================================================
// Request / response bodies
// ============================================================================

/// Body of `POST /api/steps/upload`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub provider: Option<String>,
    /// Fallback source label for samples that carry none
    pub device_id: Option<String>,
    #[serde(default)]
    pub samples: Vec<SampleDto>,
}

/// One sample as sent by a client.
///
/// Timestamps stay strings here so an unparsable one skips the sample
/// instead of rejecting the upload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDto {
    pub external_id: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub steps: Option<i64>,
    pub source: Option<String>,
}

impl UploadRequest {
    fn sample_inputs(&self) -> Vec<SampleInput> {
        let fallback_source = self
            .device_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        self.samples
            .iter()
            .map(|dto| SampleInput {
                external_id: dto.external_id.clone(),
                started_at: dto.started_at.as_deref().and_then(parse_instant),
                ended_at: dto.ended_at.as_deref().and_then(parse_instant),
                steps: dto.steps,
                source: dto
                    .source
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .or(fallback_source)
                    .map(String::from),
            })
            .collect()
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_days")]
    pub days: i64,
}

fn default_history_days() -> i64 {
    DEFAULT_HISTORY_DAYS
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Defaults to the caller's current local date
    pub date: Option<NaiveDate>,
    #[serde(default = "default_top")]
    pub top: i64,
}

fn default_top() -> i64 {
    DEFAULT_LEADERBOARD_LIMIT as i64
}

/// One day of history
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: i64,
}

impl From<DailySteps> for DailyTotal {
    fn from(row: DailySteps) -> Self {
        DailyTotal {
            date: row.date,
            total: row.steps_total,
        }
    }
}

fn to_totals(rows: Vec<DailySteps>) -> Vec<DailyTotal> {
    rows.into_iter().map(DailyTotal::from).collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/steps/upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadSummary>, AppError> {
    if let Some(key) = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        tracing::debug!(user_id = %user.id, idempotency_key = key, "Upload with idempotency key");
    }

    let samples = request.sample_inputs();
    let provider = request.provider.as_deref().unwrap_or_default();

    let summary = state
        .ingestion_service
        .ingest(&user, provider, &samples)
        .await?;

    Ok(Json(summary))
}

/// GET /api/steps/daily?from=&to=
pub async fn daily(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<Vec<DailyTotal>>, AppError> {
    let rows = state
        .history_service
        .daily(&user, query.from, query.to)
        .await?;
    Ok(Json(to_totals(rows)))
}

/// GET /api/steps/history?days=
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DailyTotal>>, AppError> {
    let rows = state.history_service.history(&user, query.days).await?;
    Ok(Json(to_totals(rows)))
}

/// GET /api/steps/leaderboard/friends?date=&top=
pub async fn friends_leaderboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let date = query.date.unwrap_or_else(|| caller_today(&user));
    let board = state
        .leaderboard_service
        .rank_friends(&user, date, query.top)
        .await?;
    Ok(Json(board))
}

/// GET /api/steps/leaderboard/groups/:group_id?date=&top=
pub async fn group_leaderboard(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(group_id): Path<Uuid>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let date = query.date.unwrap_or_else(|| caller_today(&user));
    let board = state
        .leaderboard_service
        .rank_group(&GroupId(group_id), date, query.top)
        .await?;
    Ok(Json(board))
}

fn caller_today(user: &User) -> NaiveDate {
    UserZone::parse(user.timezone.as_deref()).today(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UserId;
    use crate::test_utils::{date, ts};

    // ===== UploadRequest tests =====

    #[test]
    fn parse_upload_request_camel_case() {
        let json = r#"{
            "provider": "APPLE",
            "deviceId": "watch-1",
            "samples": [{
                "externalId": "hk-1",
                "startedAt": "2024-01-01T10:00:00Z",
                "endedAt": "2024-01-01T10:05:00Z",
                "steps": 100,
                "source": "iPhone"
            }]
        }"#;
        let request: UploadRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.provider.as_deref(), Some("APPLE"));
        assert_eq!(request.device_id.as_deref(), Some("watch-1"));

        let inputs = request.sample_inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].external_id.as_deref(), Some("hk-1"));
        assert_eq!(inputs[0].started_at, Some(ts("2024-01-01T10:00:00Z")));
        assert_eq!(inputs[0].steps, Some(100));
        assert_eq!(inputs[0].source.as_deref(), Some("iPhone"));
    }

    #[test]
    fn missing_samples_parse_as_empty() {
        let request: UploadRequest = serde_json::from_str(r#"{"provider": "mock"}"#).unwrap();
        assert!(request.samples.is_empty());
    }

    #[test]
    fn device_id_is_the_fallback_source() {
        let json = r#"{"provider": "device", "deviceId": "band-7", "samples": [{"steps": 1}]}"#;
        let request: UploadRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.sample_inputs()[0].source.as_deref(),
            Some("band-7")
        );
    }

    #[test]
    fn unparsable_timestamp_becomes_missing() {
        let json = r#"{"provider": "device", "samples": [{"steps": 1, "startedAt": "yesterday", "endedAt": "2024-01-01T10:05:00+02:00"}]}"#;
        let request: UploadRequest = serde_json::from_str(json).unwrap();
        let inputs = request.sample_inputs();

        assert_eq!(inputs[0].started_at, None);
        assert_eq!(inputs[0].ended_at, Some(ts("2024-01-01T08:05:00Z")));
    }

    // ===== Query tests =====

    #[test]
    fn history_query_defaults_to_thirty_days() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.days, 30);
    }

    #[test]
    fn leaderboard_query_defaults() {
        let query: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.top, 10);
        assert!(query.date.is_none());

        let query: LeaderboardQuery =
            serde_json::from_str(r#"{"date": "2024-01-01", "top": 3}"#).unwrap();
        assert_eq!(query.date, Some(date("2024-01-01")));
        assert_eq!(query.top, 3);
    }

    #[test]
    fn daily_query_bounds_are_optional() {
        let query: DailyQuery = serde_json::from_str(r#"{"from": "2024-01-01"}"#).unwrap();
        assert_eq!(query.from, Some(date("2024-01-01")));
        assert!(query.to.is_none());
    }

    // ===== Response tests =====

    #[test]
    fn daily_total_serializes_iso_date() {
        let row = DailySteps {
            user_id: UserId::new(),
            date: date("2024-01-01"),
            steps_total: 100,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(DailyTotal::from(row)).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2024-01-01", "total": 100}));
    }

    #[test]
    fn leaderboard_entry_serializes_username_and_total() {
        let entry = LeaderboardEntry {
            username: "alice".to_string(),
            total: 42,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"username": "alice", "total": 42}));
    }
}
