//! Tableau users API client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::{debug, instrument, warn};

use tableau_provisioner_core::{Email, UserOutcome, UserRecord};

use super::auth::{AuthSession, SignInCredentials, sign_in};
use super::types::{
    NewUser, UserBody, UserEnvelope, UserUpdate, create_user_error, update_user_error,
};
use super::{SiteTarget, TableauError};
use crate::services::DirectoryClient;

/// Header carrying the API token.
const AUTH_HEADER: &str = "X-Tableau-Auth";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tableau REST API client.
///
/// Holds only the HTTP connection pool; the server URL, API version and
/// token are passed per call so one client serves every provisioning run.
#[derive(Clone, Debug)]
pub struct TableauClient {
    client: reqwest::Client,
}

impl TableauClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new() -> Result<Self, TableauError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing HTTP client.
    #[must_use]
    pub const fn with_http_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Sign in and return the session for later calls.
    ///
    /// # Errors
    ///
    /// See [`sign_in`].
    pub async fn sign_in(
        &self,
        target: &SiteTarget,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, TableauError> {
        sign_in(&self.client, target, credentials).await
    }

    /// Add a user to the site, returning the new user's id.
    ///
    /// # Errors
    ///
    /// Returns `TableauError::Rejected` for the documented 400/404/409
    /// statuses, `UnexpectedStatus` for any other non-2xx status, and
    /// `Http`/`Parse`/`MissingUserId` when the response cannot be read.
    #[instrument(skip(self, session, record), fields(user = %record.name))]
    pub async fn add_user_to_site(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
    ) -> Result<String, TableauError> {
        let url = target.endpoint(&format!("sites/{}/users", session.site_id));
        let body = UserEnvelope {
            user: NewUser {
                name: &record.name,
                site_role: &record.site_role,
                auth_setting: &record.auth_setting,
            },
        };

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_HEADER, session.token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if let Some(message) = create_user_error(status.as_u16()) {
            return Err(TableauError::Rejected(message));
        }
        if !status.is_success() {
            return Err(TableauError::UnexpectedStatus(status.as_u16()));
        }

        let created: UserEnvelope<UserBody> = response.json().await?;
        let id = created.user.id.ok_or(TableauError::MissingUserId)?;
        debug!(user_id = %id, "User added to site");
        Ok(id)
    }

    /// Set the display name (and email, when the login is an address) of an
    /// existing user, returning the user's id.
    ///
    /// `fullName` comes from the record's full name, falling back to the
    /// login name when blank. The password attribute is never sent.
    ///
    /// # Errors
    ///
    /// Returns `TableauError::Rejected` for the documented 400/403/404/409
    /// statuses, `UnexpectedStatus` for any other non-2xx status, and
    /// `Http`/`Parse` when the response cannot be read.
    #[instrument(skip(self, session, record), fields(user = %record.name, user_id = %user_id))]
    pub async fn update_site_user(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
        user_id: &str,
    ) -> Result<String, TableauError> {
        let url = target.endpoint(&format!("sites/{}/users/{user_id}", session.site_id));
        let email = Email::parse(&record.name).ok();
        let full_name = if record.full_name.is_empty() {
            &record.name
        } else {
            &record.full_name
        };
        let body = UserEnvelope {
            user: UserUpdate {
                full_name,
                email: email.as_ref().map(Email::as_str),
            },
        };

        let response = self
            .client
            .put(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_HEADER, session.token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if let Some(message) = update_user_error(status.as_u16()) {
            return Err(TableauError::Rejected(message));
        }
        if !status.is_success() {
            return Err(TableauError::UnexpectedStatus(status.as_u16()));
        }

        let updated: UserEnvelope<UserBody> = response.json().await?;
        Ok(updated.user.id.unwrap_or_else(|| user_id.to_string()))
    }
}

#[async_trait]
impl DirectoryClient for TableauClient {
    async fn authenticate(
        &self,
        target: &SiteTarget,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, TableauError> {
        self.sign_in(target, credentials).await
    }

    async fn create_user(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
    ) -> UserOutcome {
        match self.add_user_to_site(target, session, record).await {
            Ok(id) => UserOutcome::Provisioned { id },
            Err(e) => {
                warn!(user = %record.name, error = %e, "Add user to site failed");
                UserOutcome::failed(e.to_string())
            }
        }
    }

    async fn update_user(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
        user_id: &str,
    ) -> UserOutcome {
        match self.update_site_user(target, session, record, user_id).await {
            Ok(id) => UserOutcome::Provisioned { id },
            Err(e) => {
                warn!(user = %record.name, error = %e, "Update user failed");
                UserOutcome::failed(e.to_string())
            }
        }
    }
}
