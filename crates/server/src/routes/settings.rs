//! Configuration dialog API.
//!
//! The extension front-end renders the dialog; these handlers load and save
//! the draft. The password is write-only over this API.
//!
//! Worksheet names are not served here. The front-end lists them straight
//! from the dashboard, so the dialog is opened against an empty row source.

use std::collections::HashMap;

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use tableau_provisioner_core::{ExtensionSettings, SettingsField};

use crate::error::AppError;
use crate::services::{InlineRowSource, SettingsDialog};
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings", get(show_settings).put(update_settings))
}

/// Settings as returned to the dialog.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub tableau_url: String,
    pub api_version: String,
    pub site_name: String,
    pub username: String,
    pub password_set: bool,
    pub data_sheet: String,
}

impl From<&ExtensionSettings> for SettingsView {
    fn from(settings: &ExtensionSettings) -> Self {
        Self {
            tableau_url: settings.server_url.clone(),
            api_version: settings.api_version.clone(),
            site_name: settings.site_name.clone(),
            username: settings.username.clone(),
            password_set: !settings.password.is_empty(),
            data_sheet: settings.data_source_name.clone(),
        }
    }
}

/// Open the dialog: stored settings with defaults applied.
///
/// # Errors
///
/// Returns an error if the settings store fails.
#[instrument(skip(state))]
pub async fn show_settings(State(state): State<AppState>) -> Result<Json<SettingsView>, AppError> {
    let dialog = SettingsDialog::open(state.settings(), &InlineRowSource::default()).await?;
    Ok(Json(SettingsView::from(dialog.draft())))
}

/// Save the dialog. Fields absent from the body keep their stored value; an
/// empty string clears a field.
///
/// # Errors
///
/// Returns an error if the settings store fails.
#[instrument(skip_all)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(edits): Json<HashMap<SettingsField, String>>,
) -> Result<Json<SettingsView>, AppError> {
    let mut dialog = SettingsDialog::open(state.settings(), &InlineRowSource::default()).await?;
    for (field, value) in edits {
        if value.is_empty() {
            dialog.clear(field);
        } else {
            dialog.edit(field, value);
        }
    }

    let view = SettingsView::from(dialog.draft());
    dialog.save().await?;
    Ok(Json(view))
}
