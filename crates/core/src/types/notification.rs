//! Operator-facing notifications.

use serde::{Deserialize, Serialize};

/// Severity of a notification, matching the three toast styles of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A user that could not be provisioned, as itemized in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUser {
    pub name: String,
    pub error: String,
}

/// A message shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Itemized failures, empty unless this reports a provisioning run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedUser>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
            failures: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>, failures: Vec<FailedUser>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
            failures,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_failures(mut self, failures: Vec<FailedUser>) -> Self {
        self.failures = failures;
        self
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        for failure in &self.failures {
            write!(f, "\n{}: {}", failure.name, failure.error)?;
        }
        Ok(())
    }
}
