//! Provisioning API.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use tableau_provisioner_core::{DataTable, Notification, ProvisionedUser};

use crate::error::AppError;
use crate::services::{CollectingNotifier, InlineRowSource, Provisioner, RunOutcome};
use crate::state::AppState;

/// Build the provisioning router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/provision", post(provision))
}

/// Worksheet summary data read by the front-end from the dashboard.
#[derive(Debug, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub worksheets: Vec<DataTable>,
}

/// Every notification the run emitted, plus per-user outcomes when the run
/// got as far as creating users.
#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub notifications: Vec<Notification>,
    pub users: Vec<ProvisionedUser>,
}

/// Run the workflow against the posted worksheets.
///
/// # Errors
///
/// Returns 409 if a run is already in flight, and an error if settings
/// cannot be loaded.
#[instrument(skip_all)]
pub async fn provision(
    State(state): State<AppState>,
    Json(request): Json<ProvisionRequest>,
) -> Result<Json<ProvisionResponse>, AppError> {
    info!(worksheets = request.worksheets.len(), "Provisioning requested");

    let notifier = Arc::new(CollectingNotifier::new());
    let provisioner = Provisioner::new(
        state.settings(),
        Arc::new(InlineRowSource::new(request.worksheets)),
        state.directory(),
        notifier.clone(),
    )
    .with_run_lock(state.run_lock());

    let users = match provisioner.run().await? {
        RunOutcome::Completed(report) => report.users,
        RunOutcome::Aborted(_) => Vec::new(),
    };

    Ok(Json(ProvisionResponse {
        notifications: notifier.take(),
        users,
    }))
}
