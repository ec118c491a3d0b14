//! Unified error types for the Stepboard API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Port-level errors raised by repositories and directories
//! - `AppError`: Application layer errors (typed rejections plus wrapped domain errors)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::GroupId;

/// Port-level errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Application layer errors - returned by services and HTTP handlers
///
/// The typed variants reject the whole call before any side effect.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Empty payload")]
    EmptyPayload,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Unauthorized")]
    Unauthorized,
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::EmptyPayload => (
                StatusCode::BAD_REQUEST,
                "Empty payload",
                Some("samples must not be empty".to_string()),
            ),
            AppError::UnknownProvider(provider) => (
                StatusCode::BAD_REQUEST,
                "Unknown provider",
                Some(provider.clone()),
            ),
            AppError::InvalidRange(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid range", Some(msg.clone()))
            }
            AppError::InvalidArgument(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid argument", Some(msg.clone()))
            }
            AppError::UserNotFound(username) => (
                StatusCode::NOT_FOUND,
                "User not found",
                Some(username.clone()),
            ),
            AppError::GroupNotFound(group_id) => (
                StatusCode::NOT_FOUND,
                "Group not found",
                Some(group_id.to_string()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
