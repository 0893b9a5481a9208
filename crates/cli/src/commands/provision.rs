//! Headless provisioning run.
//!
//! # Usage
//!
//! ```bash
//! tp-cli provision --table new-hires.json
//! ```
//!
//! The file holds worksheet summary data in the same shape the extension
//! posts to `/api/provision`. The worksheet named in the stored settings is
//! the one provisioned.

use std::path::PathBuf;
use std::sync::Arc;

use tableau_provisioner_server::db::PgSettingsStore;
use tableau_provisioner_server::services::{
    JsonFileRowSource, Provisioner, RunOutcome, TracingNotifier,
};
use tableau_provisioner_server::tableau::TableauClient;

use super::{CliError, connect};

/// Provision users from a worksheet file.
///
/// # Errors
///
/// Returns an error if the run could not start, or aborted before creating
/// users. Per-user failures are logged, not returned.
pub async fn run(table: PathBuf) -> Result<(), CliError> {
    let store = Arc::new(PgSettingsStore::new(connect().await?));
    let provisioner = Provisioner::new(
        store,
        Arc::new(JsonFileRowSource::new(table)),
        Arc::new(TableauClient::new()?),
        Arc::new(TracingNotifier),
    );

    match provisioner.run().await? {
        RunOutcome::Completed(report) => {
            for user in &report.users {
                match user.outcome.error() {
                    None => tracing::info!(user = %user.record.name, "Provisioned"),
                    Some(error) => tracing::warn!(user = %user.record.name, %error, "Not provisioned"),
                }
            }
            Ok(())
        }
        RunOutcome::Aborted(reason) => Err(CliError::Aborted(reason.to_string())),
    }
}
