//! Extension settings persisted by the configuration dialog.

use serde::{Deserialize, Serialize};

use super::deployment::DeploymentMode;

/// Settings key the configuration blob is stored under.
pub const SETTINGS_KEY: &str = "settings";

/// Default Tableau URL shown in a fresh configuration dialog.
pub const DEFAULT_TABLEAU_URL: &str = "https://us-west-2.online.tableau.com";

/// Default REST API version shown in a fresh configuration dialog.
pub const DEFAULT_API_VERSION: &str = "3.17";

/// Connection settings and the worksheet to read users from.
///
/// Serialized as a single JSON object using the extension's stored field
/// names. Fields missing from a stored blob fall back to their defaults.
/// `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    /// Base URL of the Tableau Server or Tableau Cloud pod.
    #[serde(rename = "tableauUrl")]
    pub server_url: String,
    /// REST API version used in request paths (e.g. `3.17`).
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// Site content URL (empty for the default site).
    #[serde(rename = "siteName")]
    pub site_name: String,
    pub username: String,
    pub password: String,
    /// Name of the worksheet holding the users to add.
    #[serde(rename = "dataSheet")]
    pub data_source_name: String,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_TABLEAU_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            site_name: String::new(),
            username: String::new(),
            password: String::new(),
            data_source_name: String::new(),
        }
    }
}

impl std::fmt::Debug for ExtensionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionSettings")
            .field("server_url", &self.server_url)
            .field("api_version", &self.api_version)
            .field("site_name", &self.site_name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("data_source_name", &self.data_source_name)
            .finish()
    }
}

impl ExtensionSettings {
    /// Parse a stored settings blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not a JSON object of string fields.
    pub fn from_json(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    /// Serialize to the stored blob format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Which Tableau deployment the configured URL points at.
    #[must_use]
    pub fn deployment_mode(&self) -> DeploymentMode {
        DeploymentMode::from_server_url(&self.server_url)
    }

    /// Read a single field.
    #[must_use]
    pub fn get(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::ServerUrl => &self.server_url,
            SettingsField::ApiVersion => &self.api_version,
            SettingsField::SiteName => &self.site_name,
            SettingsField::Username => &self.username,
            SettingsField::Password => &self.password,
            SettingsField::DataSourceName => &self.data_source_name,
        }
    }

    /// Overwrite a single field.
    pub fn set(&mut self, field: SettingsField, value: impl Into<String>) {
        let slot = match field {
            SettingsField::ServerUrl => &mut self.server_url,
            SettingsField::ApiVersion => &mut self.api_version,
            SettingsField::SiteName => &mut self.site_name,
            SettingsField::Username => &mut self.username,
            SettingsField::Password => &mut self.password,
            SettingsField::DataSourceName => &mut self.data_source_name,
        };
        *slot = value.into();
    }

    /// Whether enough is configured to attempt a sign-in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.server_url.is_empty()
            && !self.api_version.is_empty()
            && !self.username.is_empty()
            && !self.password.is_empty()
            && !self.data_source_name.is_empty()
    }
}

/// Editable fields of the configuration dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingsField {
    #[serde(rename = "tableauUrl")]
    ServerUrl,
    #[serde(rename = "apiVersion")]
    ApiVersion,
    #[serde(rename = "siteName")]
    SiteName,
    #[serde(rename = "username")]
    Username,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "dataSheet")]
    DataSourceName,
}

impl SettingsField {
    pub const ALL: [Self; 6] = [
        Self::ServerUrl,
        Self::ApiVersion,
        Self::SiteName,
        Self::Username,
        Self::Password,
        Self::DataSourceName,
    ];
}
