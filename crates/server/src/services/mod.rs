//! Provisioning services.
//!
//! # Services
//!
//! - `directory` - Remote user directory (Tableau) seam
//! - `settings_store` - Persisted extension configuration
//! - `row_source` - Worksheet data feeding a run
//! - `notifier` - Operator-facing toasts
//! - `provisioning` - The sign-in, extract, create, update, report workflow
//! - `settings_dialog` - Configuration dialog open/edit/save

pub mod directory;
pub mod notifier;
pub mod provisioning;
pub mod row_source;
pub mod settings_dialog;
pub mod settings_store;

pub use directory::DirectoryClient;
pub use notifier::{CollectingNotifier, Notifier, TracingNotifier};
pub use provisioning::{
    AbortReason, ProvisionError, Provisioner, ProvisioningReport, ProvisioningState, RunOutcome,
};
pub use row_source::{InlineRowSource, JsonFileRowSource, RowSource, RowSourceError};
pub use settings_dialog::{DialogClose, DialogError, SettingsDialog};
pub use settings_store::{
    MemorySettingsStore, SettingsError, SettingsStore, load_settings, save_settings,
};
