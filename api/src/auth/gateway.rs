//! Gateway identity middleware
//!
//! Credentials are verified upstream. The gateway forwards the verified
//! username in a header; this middleware resolves it to a `User` and injects
//! it into request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::app::require_user;
use crate::error::AppError;
use crate::AppState;

/// Extract the forwarded username, ignoring blank values
fn extract_username<'a>(headers: &'a HeaderMap, header_name: &str) -> Option<&'a str> {
    headers
        .get(header_name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Authentication middleware
///
/// A missing header is `Unauthorized`; a username with no profile is
/// `UserNotFound`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let username = extract_username(request.headers(), &state.config.auth_user_header)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = require_user(state.users.as_ref(), &username).await?;
    tracing::debug!(user_id = %user.id, username = %user.username, "Authenticated request");

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
