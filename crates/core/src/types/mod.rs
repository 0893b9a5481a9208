//! Core types for the provisioner.
//!
//! This module provides the domain types shared by the server and the CLI.

pub mod deployment;
pub mod email;
pub mod notification;
pub mod role;
pub mod settings;
pub mod table;
pub mod user;

pub use deployment::DeploymentMode;
pub use email::{Email, EmailError};
pub use notification::{FailedUser, Notification, NotificationLevel};
pub use role::SiteRole;
pub use settings::{ExtensionSettings, SETTINGS_KEY, SettingsField};
pub use table::{Cell, Column, DataTable};
pub use user::{ProvisionedUser, UserOutcome, UserRecord};
