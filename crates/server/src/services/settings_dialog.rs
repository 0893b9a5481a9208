//! Configuration dialog.
//!
//! Opening the dialog loads the stored configuration into a draft; edits
//! only touch the draft until it is saved as one blob.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use tableau_provisioner_core::{ExtensionSettings, SettingsField};

use super::row_source::{RowSource, RowSourceError};
use super::settings_store::{SettingsError, SettingsStore, load_settings, save_settings};

/// Errors opening or saving the dialog.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("Unable to load settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Unable to list worksheets: {0}")]
    RowSource(#[from] RowSourceError),
}

/// How the dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogClose {
    Saved,
    Cancelled,
}

/// An open configuration dialog.
pub struct SettingsDialog {
    store: Arc<dyn SettingsStore>,
    draft: ExtensionSettings,
    worksheets: Vec<String>,
}

impl SettingsDialog {
    /// Load the stored configuration (defaults for anything unset) and the
    /// worksheet names to choose the data source from.
    ///
    /// # Errors
    ///
    /// Returns an error if the store or row source fails.
    pub async fn open(
        store: Arc<dyn SettingsStore>,
        rows: &dyn RowSource,
    ) -> Result<Self, DialogError> {
        let draft = load_settings(store.as_ref()).await?;
        let worksheets = rows.worksheet_names().await?;
        Ok(Self {
            store,
            draft,
            worksheets,
        })
    }

    #[must_use]
    pub const fn draft(&self) -> &ExtensionSettings {
        &self.draft
    }

    #[must_use]
    pub fn worksheets(&self) -> &[String] {
        &self.worksheets
    }

    pub fn edit(&mut self, field: SettingsField, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    pub fn clear(&mut self, field: SettingsField) {
        self.draft.set(field, String::new());
    }

    /// Persist the draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft cannot be serialized or stored.
    pub async fn save(self) -> Result<DialogClose, SettingsError> {
        save_settings(self.store.as_ref(), &self.draft).await?;
        info!(
            server = %self.draft.server_url,
            site = %self.draft.site_name,
            sheet = %self.draft.data_source_name,
            "Settings saved"
        );
        Ok(DialogClose::Saved)
    }

    /// Close without writing anything.
    #[must_use]
    pub fn cancel(self) -> DialogClose {
        DialogClose::Cancelled
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tableau_provisioner_core::{DataTable, SETTINGS_KEY};

    use super::*;
    use crate::services::row_source::InlineRowSource;
    use crate::services::settings_store::MemorySettingsStore;

    fn rows() -> InlineRowSource {
        InlineRowSource::new(vec![
            DataTable::from_rows("New Hires", &[], &[]),
            DataTable::from_rows("Contractors", &[], &[]),
        ])
    }

    #[tokio::test]
    async fn test_open_applies_defaults_and_lists_worksheets() {
        let store = Arc::new(MemorySettingsStore::new());
        let dialog = SettingsDialog::open(store, &rows()).await.unwrap();

        assert_eq!(dialog.draft(), &ExtensionSettings::default());
        assert_eq!(dialog.worksheets(), ["New Hires", "Contractors"]);
    }

    #[tokio::test]
    async fn test_edit_clear_save() {
        let store = Arc::new(MemorySettingsStore::new());
        let mut dialog = SettingsDialog::open(store.clone(), &rows()).await.unwrap();

        dialog.edit(SettingsField::ServerUrl, "https://tableau.example.com");
        dialog.edit(SettingsField::Username, "svc");
        dialog.edit(SettingsField::DataSourceName, "Contractors");
        dialog.clear(SettingsField::ApiVersion);

        assert_eq!(dialog.save().await.unwrap(), DialogClose::Saved);

        let saved = ExtensionSettings::from_json(&store.persisted(SETTINGS_KEY).await.unwrap())
            .unwrap();
        assert_eq!(saved.server_url, "https://tableau.example.com");
        assert_eq!(saved.username, "svc");
        assert_eq!(saved.data_source_name, "Contractors");
        assert_eq!(saved.api_version, "");
    }

    #[tokio::test]
    async fn test_cancel_writes_nothing() {
        let store = Arc::new(MemorySettingsStore::new());
        let mut dialog = SettingsDialog::open(store.clone(), &rows()).await.unwrap();
        dialog.edit(SettingsField::Password, "changed");

        assert_eq!(dialog.cancel(), DialogClose::Cancelled);
        assert!(store.get(SETTINGS_KEY).await.unwrap().is_none());
    }
}
