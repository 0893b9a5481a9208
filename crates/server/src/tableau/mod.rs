//! Tableau REST API client.
//!
//! Provides the three calls the provisioner needs: sign in, add user to site,
//! and update user.
//!
//! # Architecture
//!
//! - Credentials are exchanged for a site id and an API token
//!   (`POST /api/{version}/auth/signin`)
//! - The token is sent in the `X-Tableau-Auth` header on every later call
//! - The API version is part of every path and comes from the saved settings
//! - Tokens live for one provisioning run and are never persisted
//!
//! # Error mapping
//!
//! Add-user and update-user never fail the whole run. Each call resolves to a
//! [`UserOutcome`](tableau_provisioner_core::UserOutcome); documented 4xx
//! statuses become the fixed messages in [`types`].

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AuthSession, SignInCredentials};
pub use client::TableauClient;

use thiserror::Error;

/// Errors that can occur when interacting with the Tableau REST API.
#[derive(Debug, Error)]
pub enum TableauError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured server URL is not a valid absolute URL.
    #[error("Invalid Tableau URL: {0}")]
    InvalidUrl(String),

    /// Sign-in was rejected.
    #[error("Sign-in failed: {0}")]
    SignIn(String),

    /// Tableau rejected the call with a documented status.
    #[error("{0}")]
    Rejected(&'static str),

    /// Tableau answered with a status this client has no mapping for.
    #[error("Tableau returned HTTP {0}")]
    UnexpectedStatus(u16),

    /// A success response did not carry the user id.
    #[error("Tableau response did not include a user id")]
    MissingUserId,
}

/// Server URL and API version every request path is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    server_url: String,
    api_version: String,
}

impl SiteTarget {
    /// Build a target, validating the URL and trimming any trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `TableauError::InvalidUrl` if the URL does not parse or is not
    /// http(s).
    pub fn new(server_url: &str, api_version: &str) -> Result<Self, TableauError> {
        let trimmed = server_url.trim().trim_end_matches('/');
        let parsed =
            url::Url::parse(trimmed).map_err(|e| TableauError::InvalidUrl(format!("{trimmed}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TableauError::InvalidUrl(format!(
                "{trimmed}: scheme must be http or https"
            )));
        }

        Ok(Self {
            server_url: trimmed.to_string(),
            api_version: api_version.trim().to_string(),
        })
    }

    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Absolute URL for a versioned API path (without leading slash).
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}/{path}", self.server_url, self.api_version)
    }
}
