//! Tableau sign-in.
//!
//! Exchanges a username/password for the site id and API token used by every
//! later call in the same provisioning run.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tableau_provisioner_core::ExtensionSettings;

use super::{SiteTarget, TableauError};

/// Credentials for `POST /auth/signin`.
#[derive(Clone)]
pub struct SignInCredentials {
    /// Site content URL (empty string for the default site).
    pub site_name: String,
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for SignInCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInCredentials")
            .field("site_name", &self.site_name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignInCredentials {
    #[must_use]
    pub fn from_settings(settings: &ExtensionSettings) -> Self {
        Self {
            site_name: settings.site_name.clone(),
            username: settings.username.clone(),
            password: SecretString::from(settings.password.clone()),
        }
    }
}

/// Site id and API token for one provisioning run.
#[derive(Clone)]
pub struct AuthSession {
    pub site_id: String,
    pub token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("site_id", &self.site_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    credentials: RequestCredentials<'a>,
}

#[derive(Serialize)]
struct RequestCredentials<'a> {
    name: &'a str,
    password: &'a str,
    site: RequestSite<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestSite<'a> {
    content_url: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    #[serde(default)]
    credentials: Option<ResponseCredentials>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ResponseCredentials {
    site: ResponseSite,
    token: String,
}

#[derive(Deserialize)]
struct ResponseSite {
    id: String,
}

/// Error object Tableau returns instead of `credentials`.
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiError {
    fn describe(self) -> String {
        let text = self
            .detail
            .or(self.summary)
            .unwrap_or_else(|| "Tableau rejected the credentials".to_string());
        match self.code {
            Some(code) => format!("{text} ({code})"),
            None => text,
        }
    }
}

/// Sign in to a Tableau site.
///
/// # Errors
///
/// Returns `TableauError::SignIn` if the response carries an error object or
/// no credentials, `TableauError::UnexpectedStatus` for other non-2xx
/// responses, and `Http`/`Parse` for transport and body failures.
#[instrument(skip(client, credentials), fields(server = %target.server_url(), site = %credentials.site_name, username = %credentials.username))]
pub async fn sign_in(
    client: &reqwest::Client,
    target: &SiteTarget,
    credentials: &SignInCredentials,
) -> Result<AuthSession, TableauError> {
    let response = client
        .post(target.endpoint("auth/signin"))
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&SignInRequest {
            credentials: RequestCredentials {
                name: &credentials.username,
                password: credentials.password.expose_secret(),
                site: RequestSite {
                    content_url: &credentials.site_name,
                },
            },
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    let parsed: SignInResponse = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(_) if !status.is_success() => {
            return Err(TableauError::UnexpectedStatus(status.as_u16()));
        }
        Err(e) => return Err(TableauError::Parse(e)),
    };

    if let Some(error) = parsed.error {
        return Err(TableauError::SignIn(error.describe()));
    }
    if !status.is_success() {
        return Err(TableauError::UnexpectedStatus(status.as_u16()));
    }

    let credentials = parsed
        .credentials
        .ok_or_else(|| TableauError::SignIn("response did not include credentials".to_string()))?;

    tracing::debug!(site_id = %credentials.site.id, "Signed in to Tableau");

    Ok(AuthSession {
        site_id: credentials.site.id,
        token: SecretString::from(credentials.token),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn credentials() -> SignInCredentials {
        SignInCredentials {
            site_name: "finance".to_string(),
            username: "svc".to_string(),
            password: SecretString::from("pw"),
        }
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.17/auth/signin"))
            .and(header("Accept", "application/json"))
            .and(body_json(json!({
                "credentials": {
                    "name": "svc",
                    "password": "pw",
                    "site": {"contentUrl": "finance"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credentials": {
                    "site": {"id": "site-123", "contentUrl": "finance"},
                    "user": {"id": "user-1"},
                    "token": "tok-abc"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let target = SiteTarget::new(&server.uri(), "3.17").unwrap();
        let session = sign_in(&reqwest::Client::new(), &target, &credentials())
            .await
            .unwrap();

        assert_eq!(session.site_id, "site-123");
        assert_eq!(session.token.expose_secret(), "tok-abc");
    }

    #[tokio::test]
    async fn test_sign_in_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/3.17/auth/signin"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "summary": "Signin Error",
                    "detail": "Error signing in to Tableau Server",
                    "code": "401001"
                }
            })))
            .mount(&server)
            .await;

        let target = SiteTarget::new(&server.uri(), "3.17").unwrap();
        let err = sign_in(&reqwest::Client::new(), &target, &credentials())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Sign-in failed: Error signing in to Tableau Server (401001)"
        );
    }

    #[tokio::test]
    async fn test_sign_in_non_json_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
            .mount(&server)
            .await;

        let target = SiteTarget::new(&server.uri(), "3.17").unwrap();
        let err = sign_in(&reqwest::Client::new(), &target, &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, TableauError::UnexpectedStatus(503)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let session = AuthSession {
            site_id: "s".to_string(),
            token: SecretString::from("tok-abc"),
        };
        assert!(!format!("{session:?}").contains("tok-abc"));
        assert!(!format!("{:?}", credentials()).contains("\"pw\""));
    }
}
