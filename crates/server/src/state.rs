//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::config::ServerConfig;
use crate::db::PgSettingsStore;
use crate::services::{DirectoryClient, SettingsStore};
use crate::tableau::{TableauClient, TableauError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    settings: Arc<dyn SettingsStore>,
    directory: Arc<dyn DirectoryClient>,
    run_lock: Arc<Mutex<()>>,
    api_token: Option<SecretString>,
}

impl AppState {
    /// Build production state: Postgres-backed settings and the Tableau REST
    /// client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ServerConfig, pool: PgPool) -> Result<Self, TableauError> {
        Ok(Self::from_parts(
            Arc::new(PgSettingsStore::new(pool)),
            Arc::new(TableauClient::new()?),
            config.api_token.clone(),
        ))
    }

    /// Build state from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        settings: Arc<dyn SettingsStore>,
        directory: Arc<dyn DirectoryClient>,
        api_token: Option<SecretString>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                settings,
                directory,
                run_lock: Arc::default(),
                api_token,
            }),
        }
    }

    #[must_use]
    pub fn settings(&self) -> Arc<dyn SettingsStore> {
        Arc::clone(&self.inner.settings)
    }

    #[must_use]
    pub fn directory(&self) -> Arc<dyn DirectoryClient> {
        Arc::clone(&self.inner.directory)
    }

    /// Guard shared by every provisioning run started through this host.
    #[must_use]
    pub fn run_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.inner.run_lock)
    }

    #[must_use]
    pub fn api_token(&self) -> Option<&SecretString> {
        self.inner.api_token.as_ref()
    }
}
