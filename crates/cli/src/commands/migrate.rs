//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! tp-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PROVISIONER_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to `DATABASE_URL`)
//!
//! Migrations live in `crates/server/migrations/`.

use super::{CliError, connect};

/// Run provisioner database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running provisioner migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Provisioner migrations complete!");
    Ok(())
}
