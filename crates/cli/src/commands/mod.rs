//! CLI subcommands.

pub mod migrate;
pub mod provision;
pub mod settings;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use tableau_provisioner_server::db;
use tableau_provisioner_server::services::{DialogError, ProvisionError, SettingsError};
use tableau_provisioner_server::tableau::TableauError;

/// Errors that can occur running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error("Tableau client error: {0}")]
    Tableau(#[from] TableauError),

    /// The run stopped before creating users.
    #[error("Provisioning aborted: {0}")]
    Aborted(String),
}

/// Connect to the provisioner database.
///
/// Reads `PROVISIONER_DATABASE_URL`, falling back to `DATABASE_URL`.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("PROVISIONER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("PROVISIONER_DATABASE_URL"))?;

    tracing::info!("Connecting to provisioner database...");
    Ok(db::create_pool(&SecretString::from(database_url)).await?)
}
