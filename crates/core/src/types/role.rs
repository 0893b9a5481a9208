//! Tableau site roles.

use serde::{Deserialize, Serialize};

/// License and permission tier assigned to a user on a Tableau site.
///
/// The serialized form matches the REST API's `siteRole` attribute exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteRole {
    Explorer,
    ExplorerCanPublish,
    SiteAdministratorCreator,
    SiteAdministratorExplorer,
    Unlicensed,
    Viewer,
}

impl SiteRole {
    /// Every role the add-user endpoint accepts, in the order Tableau documents them.
    pub const ALL: [Self; 6] = [
        Self::Explorer,
        Self::ExplorerCanPublish,
        Self::SiteAdministratorCreator,
        Self::SiteAdministratorExplorer,
        Self::Unlicensed,
        Self::Viewer,
    ];

    /// The REST API spelling of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explorer => "Explorer",
            Self::ExplorerCanPublish => "ExplorerCanPublish",
            Self::SiteAdministratorCreator => "SiteAdministratorCreator",
            Self::SiteAdministratorExplorer => "SiteAdministratorExplorer",
            Self::Unlicensed => "Unlicensed",
            Self::Viewer => "Viewer",
        }
    }
}

impl std::fmt::Display for SiteRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SiteRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("invalid site role: {s}"))
    }
}
