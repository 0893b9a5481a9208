//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (settings store reachable)
//!
//! # Settings dialog
//! GET  /api/settings           - Stored settings with defaults (password redacted)
//! PUT  /api/settings           - Apply field edits and save
//!
//! # Provisioning
//! POST /api/provision          - Run the workflow against posted worksheets
//! ```
//!
//! `/api/*` requires `Authorization: Bearer <PROVISIONER_API_TOKEN>` when the
//! token is configured.

pub mod health;
pub mod provision;
pub mod settings;

use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::require_api_token;
use crate::state::AppState;

/// Routes that sit behind the API token guard.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(settings::router())
        .merge(provision::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_token,
        ))
}

/// Build the complete application router with tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .merge(health::router())
        .merge(api_routes(&state))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
