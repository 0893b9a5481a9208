//! Bearer-token guard for the API routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Reject requests without `Authorization: Bearer <PROVISIONER_API_TOKEN>`.
///
/// Passes everything through when no token is configured.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is missing, malformed, or
/// carries the wrong token.
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.api_token() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    if !constant_time_eq(presented.as_bytes(), expected.expose_secret().as_bytes()) {
        tracing::warn!(path = %request.uri().path(), "Rejected API token");
        return Err(AppError::Unauthorized("invalid bearer token".to_string()));
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
