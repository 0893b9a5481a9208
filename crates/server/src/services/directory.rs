//! Remote user directory.

use async_trait::async_trait;

use tableau_provisioner_core::{UserOutcome, UserRecord};

use crate::tableau::{AuthSession, SignInCredentials, SiteTarget, TableauError};

/// The three remote calls a provisioning run makes.
///
/// Only sign-in can fail the run. Per-user calls always resolve to an
/// outcome so one rejected user never stops its siblings.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Exchange credentials for a site id and API token.
    async fn authenticate(
        &self,
        target: &SiteTarget,
        credentials: &SignInCredentials,
    ) -> Result<AuthSession, TableauError>;

    /// Add a user to the site.
    async fn create_user(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
    ) -> UserOutcome;

    /// Fill in the attributes add-user cannot set (Tableau Server only).
    async fn update_user(
        &self,
        target: &SiteTarget,
        session: &AuthSession,
        record: &UserRecord,
        user_id: &str,
    ) -> UserOutcome;
}
