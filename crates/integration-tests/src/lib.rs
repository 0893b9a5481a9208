//! Integration tests for the Tableau provisioner.
//!
//! Tests drive the real workflow, REST client and HTTP router against a
//! wiremock stand-in for the Tableau REST API. No database is needed;
//! settings live in a [`MemorySettingsStore`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tableau-provisioner-integration-tests
//! ```
//!
//! Tableau Cloud is detected from `online.tableau.com` anywhere in the
//! server URL, so [`MockTableau::start_cloud`] mounts the API under an
//! `/online.tableau.com` path prefix on the local mock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tableau_provisioner_core::{DataTable, ExtensionSettings};
use tableau_provisioner_server::services::provisioning::REQUIRED_FIELDS;
use tableau_provisioner_server::services::{
    CollectingNotifier, InlineRowSource, MemorySettingsStore, Provisioner,
};
use tableau_provisioner_server::tableau::TableauClient;

pub const API_VERSION: &str = "3.17";
pub const SITE_ID: &str = "site-1";
pub const TOKEN: &str = "tok-1";
pub const SHEET: &str = "New Hires";

/// Mock Tableau REST API.
pub struct MockTableau {
    pub server: MockServer,
    prefix: &'static str,
}

impl MockTableau {
    /// A Tableau Server deployment.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            prefix: "",
        }
    }

    /// A Tableau Cloud deployment.
    pub async fn start_cloud() -> Self {
        Self {
            server: MockServer::start().await,
            prefix: "/online.tableau.com",
        }
    }

    /// Server URL to store in the settings.
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("{}{}", self.server.uri(), self.prefix)
    }

    fn api_path(&self, rest: &str) -> String {
        format!("{}/api/{API_VERSION}/{rest}", self.prefix)
    }

    /// Settings pointing at this mock and the default worksheet.
    #[must_use]
    pub fn settings(&self) -> ExtensionSettings {
        ExtensionSettings {
            server_url: self.server_url(),
            api_version: API_VERSION.to_string(),
            site_name: "finance".to_string(),
            username: "svc-provisioner".to_string(),
            password: "pw".to_string(),
            data_source_name: SHEET.to_string(),
        }
    }

    pub async fn mock_sign_in(&self) {
        Mock::given(method("POST"))
            .and(path(self.api_path("auth/signin")))
            .and(body_partial_json(json!({
                "credentials": {"name": "svc-provisioner", "site": {"contentUrl": "finance"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credentials": {
                    "site": {"id": SITE_ID, "contentUrl": "finance"},
                    "user": {"id": "svc-user"},
                    "token": TOKEN
                }
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_sign_in_rejected(&self) {
        Mock::given(method("POST"))
            .and(path(self.api_path("auth/signin")))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "summary": "Signin Error",
                    "detail": "Error signing in to Tableau Server",
                    "code": "401001"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// Add-user for `name`: 201 with `user_id`, or the given error status.
    pub async fn mock_create(&self, name: &str, status: u16, user_id: &str) {
        let response = if (200..300).contains(&status) {
            ResponseTemplate::new(status)
                .set_body_json(json!({"user": {"id": user_id, "name": name}}))
        } else {
            ResponseTemplate::new(status)
        };
        Mock::given(method("POST"))
            .and(path(self.api_path(&format!("sites/{SITE_ID}/users"))))
            .and(header("X-Tableau-Auth", TOKEN))
            .and(body_partial_json(json!({"user": {"name": name}})))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Update-user for `user_id`.
    pub async fn mock_update(&self, user_id: &str, status: u16) {
        let response = if (200..300).contains(&status) {
            ResponseTemplate::new(status).set_body_json(json!({"user": {"id": user_id}}))
        } else {
            ResponseTemplate::new(status)
        };
        Mock::given(method("PUT"))
            .and(path(self.api_path(&format!("sites/{SITE_ID}/users/{user_id}"))))
            .and(header("X-Tableau-Auth", TOKEN))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Number of received requests with this method whose path contains
    /// `fragment`.
    pub async fn count(&self, http_method: &str, fragment: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| {
                request.method.as_str() == http_method && request.url.path().contains(fragment)
            })
            .count()
    }

    /// Requests to the users endpoints, of any method.
    pub async fn user_calls(&self) -> usize {
        self.count("POST", "/users").await + self.count("PUT", "/users").await
    }
}

/// A worksheet with the four required columns and one row per user.
#[must_use]
pub fn users_table(rows: &[[&str; 4]]) -> DataTable {
    let rows: Vec<&[&str]> = rows.iter().map(<[&str; 4]>::as_slice).collect();
    DataTable::from_rows(SHEET, &REQUIRED_FIELDS, &rows)
}

/// A provisioner wired to the real Tableau client and in-memory collaborators.
///
/// # Panics
///
/// Panics if the settings cannot be serialized or the HTTP client fails to
/// build.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn provisioner(
    settings: &ExtensionSettings,
    worksheets: Vec<DataTable>,
) -> (Provisioner, Arc<CollectingNotifier>) {
    let notifier = Arc::new(CollectingNotifier::new());
    let provisioner = Provisioner::new(
        Arc::new(MemorySettingsStore::with_settings(settings).unwrap()),
        Arc::new(InlineRowSource::new(worksheets)),
        Arc::new(TableauClient::new().unwrap()),
        notifier.clone(),
    );
    (provisioner, notifier)
}
