//! User records and their provisioning outcomes.

use serde::{Deserialize, Serialize};

use super::role::SiteRole;

/// One row of the source worksheet, mapped onto the add-user shape.
///
/// Records are never mutated once extracted. The result of provisioning is
/// carried separately as a [`UserOutcome`] and paired with the record in a
/// [`ProvisionedUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Login identifier (usually an email address).
    pub name: String,
    /// Display name.
    pub full_name: String,
    /// Raw `siteRole` cell text. Invalid values are left for Tableau to reject.
    pub site_role: String,
    /// Authentication setting (e.g. `ServerDefault`, `SAML`).
    pub auth_setting: String,
}

impl UserRecord {
    /// Parse the site role cell, if it names a known role.
    #[must_use]
    pub fn parsed_site_role(&self) -> Option<SiteRole> {
        self.site_role.parse().ok()
    }
}

/// Result of the create/update calls for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UserOutcome {
    /// The user exists on the site with this id.
    Provisioned {
        /// Tableau user LUID.
        id: String,
    },
    /// The user could not be provisioned.
    Failed {
        /// Human-readable reason.
        error: String,
    },
}

impl UserOutcome {
    /// Build a failed outcome from any message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// The user id, when provisioning succeeded.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Provisioned { id } => Some(id),
            Self::Failed { .. } => None,
        }
    }

    /// The error message, when provisioning failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Provisioned { .. } => None,
            Self::Failed { error } => Some(error),
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A record paired with its final outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedUser {
    #[serde(flatten)]
    pub record: UserRecord,
    pub outcome: UserOutcome,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(role: &str) -> UserRecord {
        UserRecord {
            name: "ana@example.com".to_string(),
            full_name: "Ana Lopez".to_string(),
            site_role: role.to_string(),
            auth_setting: "ServerDefault".to_string(),
        }
    }

    #[test]
    fn test_parsed_site_role() {
        assert_eq!(record("Viewer").parsed_site_role(), Some(SiteRole::Viewer));
        assert_eq!(record("creator").parsed_site_role(), None);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = UserOutcome::Provisioned {
            id: "abc".to_string(),
        };
        assert_eq!(ok.id(), Some("abc"));
        assert_eq!(ok.error(), None);
        assert!(!ok.is_failed());

        let failed = UserOutcome::failed("nope");
        assert_eq!(failed.id(), None);
        assert_eq!(failed.error(), Some("nope"));
        assert!(failed.is_failed());
    }

    #[test]
    fn test_provisioned_user_serializes_flat() {
        let user = ProvisionedUser {
            record: record("Viewer"),
            outcome: UserOutcome::failed("already exists"),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["name"], "ana@example.com");
        assert_eq!(value["siteRole"], "Viewer");
        assert_eq!(value["outcome"]["status"], "failed");
        assert_eq!(value["outcome"]["error"], "already exists");
    }
}
