//! Extension settings storage.
//!
//! The store is a string key/value map with staged writes: `set` only
//! records the value, `save` makes every staged value durable. The whole
//! configuration lives under one key as a JSON blob.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tableau_provisioner_core::{ExtensionSettings, SETTINGS_KEY};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value settings persistence.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Current value for a key, including staged but unsaved writes.
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Stage a value. Not durable until [`save`](Self::save).
    async fn set(&self, key: &str, value: String) -> Result<(), SettingsError>;

    /// Persist every staged value.
    async fn save(&self) -> Result<(), SettingsError>;

    /// Whether the backing storage is reachable.
    async fn health_check(&self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Load the configuration, falling back to defaults when nothing is stored.
///
/// # Errors
///
/// Returns an error if the store fails or the stored blob is not valid JSON.
pub async fn load_settings(store: &dyn SettingsStore) -> Result<ExtensionSettings, SettingsError> {
    match store.get(SETTINGS_KEY).await? {
        Some(blob) if !blob.trim().is_empty() => Ok(ExtensionSettings::from_json(&blob)?),
        _ => Ok(ExtensionSettings::default()),
    }
}

/// Stage and persist the whole configuration.
///
/// # Errors
///
/// Returns an error if serialization or the store fails.
pub async fn save_settings(
    store: &dyn SettingsStore,
    settings: &ExtensionSettings,
) -> Result<(), SettingsError> {
    store.set(SETTINGS_KEY, settings.to_json()?).await?;
    store.save().await
}

/// In-process store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: Mutex<HashMap<String, String>>,
    staged: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a saved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized.
    pub fn with_settings(settings: &ExtensionSettings) -> Result<Self, SettingsError> {
        let saved = HashMap::from([(SETTINGS_KEY.to_string(), settings.to_json()?)]);
        Ok(Self {
            saved: Mutex::new(saved),
            staged: Mutex::default(),
        })
    }

    /// The durable value for a key, ignoring staged writes.
    pub async fn persisted(&self, key: &str) -> Option<String> {
        self.saved.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        if let Some(value) = self.staged.lock().await.get(key) {
            return Ok(Some(value.clone()));
        }
        Ok(self.saved.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SettingsError> {
        self.staged.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn save(&self) -> Result<(), SettingsError> {
        let staged = std::mem::take(&mut *self.staged.lock().await);
        self.saved.lock().await.extend(staged);
        Ok(())
    }
}
