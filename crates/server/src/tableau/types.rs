//! Request/response bodies and status-code messages for the users endpoints.

use serde::{Deserialize, Serialize};

pub const CREATE_USER_CONFLICT: &str = "The specified user already exists on the site";
pub const CREATE_USER_NOT_FOUND: &str = "The server is configured to use Active Directory for authentication, and the username specified in the request body doesn't match an existing user in Active Directory.";
pub const CREATE_USER_BAD_REQUEST: &str = "The value of the siteRole attribute must be Explorer, ExplorerCanPublish, SiteAdministratorCreator, SiteAdministratorExplorer, Unlicensed, or Viewer.";

pub const UPDATE_USER_BAD_REQUEST: &str =
    "The email attribute does not contain a valid email address.";
pub const UPDATE_USER_FORBIDDEN: &str = "A user cannot update their own licensing role.";
pub const UPDATE_USER_NOT_FOUND: &str =
    "The user ID in the URI doesn't correspond to an existing user.";
pub const UPDATE_USER_CONFLICT: &str = "The user with the specified name is already registered on the site in the same domain OR the request is attempting to update the user to a licensing role that has insufficient capacity.";

/// Documented failure for an add-user status, if any.
#[must_use]
pub const fn create_user_error(status: u16) -> Option<&'static str> {
    match status {
        409 => Some(CREATE_USER_CONFLICT),
        404 => Some(CREATE_USER_NOT_FOUND),
        400 => Some(CREATE_USER_BAD_REQUEST),
        _ => None,
    }
}

/// Documented failure for an update-user status, if any.
#[must_use]
pub const fn update_user_error(status: u16) -> Option<&'static str> {
    match status {
        400 => Some(UPDATE_USER_BAD_REQUEST),
        403 => Some(UPDATE_USER_FORBIDDEN),
        404 => Some(UPDATE_USER_NOT_FOUND),
        409 => Some(UPDATE_USER_CONFLICT),
        _ => None,
    }
}

/// `{"user": {...}}` envelope used by both users endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope<T> {
    pub user: T,
}

/// Body of the add-user call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub site_role: &'a str,
    pub auth_setting: &'a str,
}

/// Body of the update-user call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate<'a> {
    pub full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

/// The part of a user response we read.
#[derive(Debug, Deserialize)]
pub struct UserBody {
    #[serde(default)]
    pub id: Option<String>,
}
