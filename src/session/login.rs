//! Email and password login against the API's REST endpoint.

use std::fmt;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{AtriumError, Result};

use super::SessionHandle;

const DEFAULT_LOGIN_ERROR: &str = "Invalid email or password";

pub struct Credentials {
    pub email: String,
    pub password: SecretBox<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: String) -> Self {
        Self {
            email: email.into(),
            password: SecretBox::new(Box::new(password)),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

#[derive(Deserialize)]
struct LoginErrorBody {
    error: Option<String>,
}

/// The message to show for a rejected login response body.
fn login_error_message(body: &str) -> String {
    serde_json::from_str::<LoginErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string())
}

/// `<api_url>/login`
pub fn login_url(api_url: &Url) -> Result<Url> {
    Ok(api_url.join("login")?)
}

/// Exchange credentials for a token and store it in `session`.
pub async fn login(
    client: &Client,
    api_url: &Url,
    credentials: &Credentials,
    session: &SessionHandle,
) -> Result<LoginResponse> {
    let url = login_url(api_url)?;
    debug!(email = %credentials.email, %url, "logging in");

    let response = client
        .post(url)
        .json(&LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        })
        .send()
        .await
        .map_err(|e| AtriumError::Network(e.to_string()))?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        debug!(status = status.as_u16(), "login rejected");
        return Err(AtriumError::LoginFailed(login_error_message(&body)));
    }

    let parsed: LoginResponse = serde_json::from_str(&body)?;
    session.login(parsed.token.clone(), parsed.user.clone())?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        assert_eq!(
            login_error_message(r#"{"error": "Account locked"}"#),
            "Account locked"
        );
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(login_error_message("<html>oops</html>"), DEFAULT_LOGIN_ERROR);
        assert_eq!(login_error_message(r#"{"error": ""}"#), DEFAULT_LOGIN_ERROR);
        assert_eq!(login_error_message("{}"), DEFAULT_LOGIN_ERROR);
    }

    #[test]
    fn test_login_url_joins_base() {
        let base = Url::parse("https://erp.example.com/api/").unwrap();
        assert_eq!(
            login_url(&base).unwrap().as_str(),
            "https://erp.example.com/api/login"
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ada@example.com", "hunter2".to_string());
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_response_user_optional() {
        let parsed: LoginResponse = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(parsed.token, "abc");
        assert!(parsed.user.is_null());
    }
}
