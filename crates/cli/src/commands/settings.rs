//! Settings commands, the operator's view of the configuration dialog.
//!
//! # Usage
//!
//! ```bash
//! # Show stored settings, and the worksheets a file offers
//! tp-cli settings show --table new-hires.json
//!
//! # Save settings (unspecified fields keep their stored value)
//! TABLEAU_PASSWORD=... tp-cli settings save \
//!     --url https://tableau.corp.local --site finance \
//!     --username svc-provisioner --sheet "New Hires"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tableau_provisioner_core::SettingsField;
use tableau_provisioner_server::db::PgSettingsStore;
use tableau_provisioner_server::services::{
    DialogClose, InlineRowSource, JsonFileRowSource, RowSource, SettingsDialog,
};

use super::{CliError, connect};

/// Field edits collected from the command line. `Some("")` clears a field.
#[derive(Debug, Default)]
pub struct SettingsEdits {
    pub server_url: Option<String>,
    pub api_version: Option<String>,
    pub site_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub data_source_name: Option<String>,
}

impl SettingsEdits {
    fn into_fields(self) -> impl Iterator<Item = (SettingsField, String)> {
        [
            (SettingsField::ServerUrl, self.server_url),
            (SettingsField::ApiVersion, self.api_version),
            (SettingsField::SiteName, self.site_name),
            (SettingsField::Username, self.username),
            (SettingsField::Password, self.password),
            (SettingsField::DataSourceName, self.data_source_name),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

/// Print the stored settings (password redacted) and available worksheets.
///
/// # Errors
///
/// Returns an error if the database or worksheet file cannot be read.
pub async fn show(table: Option<PathBuf>) -> Result<(), CliError> {
    let store = Arc::new(PgSettingsStore::new(connect().await?));
    let rows: Box<dyn RowSource> = match table {
        Some(path) => Box::new(JsonFileRowSource::new(path)),
        None => Box::new(InlineRowSource::default()),
    };

    let dialog = SettingsDialog::open(store, rows.as_ref()).await?;
    let draft = dialog.draft();

    #[allow(clippy::print_stdout)]
    {
        println!("Tableau URL:   {}", draft.server_url);
        println!("API version:   {}", draft.api_version);
        println!("Site:          {}", draft.site_name);
        println!("Username:      {}", draft.username);
        println!(
            "Password:      {}",
            if draft.password.is_empty() { "(not set)" } else { "********" }
        );
        println!("Data sheet:    {}", draft.data_source_name);
        println!("Deployment:    {:?}", draft.deployment_mode());
        for sheet in dialog.worksheets() {
            println!("  worksheet: {sheet}");
        }
    }

    Ok(())
}

/// Apply edits to the stored settings and save them.
///
/// # Errors
///
/// Returns an error if the database cannot be read or written.
pub async fn save(edits: SettingsEdits) -> Result<(), CliError> {
    let store = Arc::new(PgSettingsStore::new(connect().await?));
    let mut dialog = SettingsDialog::open(store, &InlineRowSource::default()).await?;

    for (field, value) in edits.into_fields() {
        if value.is_empty() {
            dialog.clear(field);
        } else {
            dialog.edit(field, value);
        }
    }

    if dialog.save().await? == DialogClose::Saved {
        tracing::info!("Settings saved");
    }
    Ok(())
}
