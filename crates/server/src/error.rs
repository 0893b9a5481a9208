//! Unified error handling for the HTTP host.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::{DialogError, ProvisionError, RowSourceError, SettingsError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings storage failed.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Worksheet data could not be read.
    #[error("Worksheet error: {0}")]
    RowSource(#[from] RowSourceError),

    /// Caller is missing or presented a wrong API token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request conflicts with work already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<ProvisionError> for AppError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::AlreadyRunning => Self::Conflict(err.to_string()),
            ProvisionError::Settings(e) => Self::Settings(e),
            ProvisionError::RowSource(e) => Self::RowSource(e),
        }
    }
}

impl From<DialogError> for AppError {
    fn from(err: DialogError) -> Self {
        match err {
            DialogError::Settings(e) => Self::Settings(e),
            DialogError::RowSource(e) => Self::RowSource(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Settings(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Provisioner request error"
            );
        }

        let status = match &self {
            Self::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RowSource(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Settings(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
