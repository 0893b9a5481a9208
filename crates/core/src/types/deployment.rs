//! Tableau deployment variants.

use serde::{Deserialize, Serialize};

/// Hostname fragment shared by every Tableau Cloud pod.
pub const CLOUD_HOST_MARKER: &str = "online.tableau.com";

/// Which flavour of Tableau the configured URL points at.
///
/// Tableau Server cannot set the display name and email when a user is
/// created, so provisioning against it needs a follow-up update call.
/// Tableau Cloud does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    Server,
    Cloud,
}

impl DeploymentMode {
    /// Infer the deployment from the configured server URL.
    #[must_use]
    pub fn from_server_url(url: &str) -> Self {
        if url.contains(CLOUD_HOST_MARKER) {
            Self::Cloud
        } else {
            Self::Server
        }
    }

    /// Whether created users need the follow-up update call.
    #[must_use]
    pub const fn requires_update(self) -> bool {
        matches!(self, Self::Server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_pods_are_detected() {
        assert_eq!(
            DeploymentMode::from_server_url("https://us-west-2.online.tableau.com"),
            DeploymentMode::Cloud
        );
        assert_eq!(
            DeploymentMode::from_server_url("https://prod-uk-a.online.tableau.com/"),
            DeploymentMode::Cloud
        );
    }

    #[test]
    fn test_everything_else_is_server() {
        assert_eq!(
            DeploymentMode::from_server_url("https://tableau.corp.example.com"),
            DeploymentMode::Server
        );
        assert_eq!(
            DeploymentMode::from_server_url("http://127.0.0.1:8080"),
            DeploymentMode::Server
        );
    }

    #[test]
    fn test_only_server_requires_update() {
        assert!(DeploymentMode::Server.requires_update());
        assert!(!DeploymentMode::Cloud.requires_update());
    }
}
