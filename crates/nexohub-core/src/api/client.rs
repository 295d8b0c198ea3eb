//! HTTP client for the NexoHub authentication API.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::SessionToken;
use crate::config::Config;

use super::error::truncate_body;
use super::LoginError;

// ============================================================================
// Constants
// ============================================================================

/// Default API origin for a local development stack.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default path of the login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/api/v1/auth/login";

const HEALTH_PATH: &str = "/health";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const JSON: &str = "application/json";

/// Body of `POST <login_path>`.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Success body as sent on the wire. Only `access_token` is required to be
/// well-formed; extras of an unexpected type are dropped.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<Value>,
    #[serde(default)]
    expires_in: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    role: Option<Value>,
}

fn as_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

impl TokenResponse {
    fn into_session_token(self) -> Option<SessionToken> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        Some(SessionToken {
            access_token,
            token_type: as_string(self.token_type),
            expires_in: self.expires_in.as_ref().and_then(Value::as_u64),
            user_id: self.user_id.as_ref().and_then(Value::as_i64),
            role: as_string(self.role),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Exchanges credentials for a session token.
///
/// The form controller only talks to this seam, so the HTTP client can be
/// swapped out in tests.
#[async_trait]
pub trait LoginTransport: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<SessionToken, LoginError>;
}

/// Client for the authentication API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    login_path: String,
}

impl AuthClient {
    /// Create a client for `base_url` with the default login path and timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(base_url.into(), DEFAULT_LOGIN_PATH.to_string(), DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(
            config.api_base_url.clone(),
            config.login_path.clone(),
            config.request_timeout_secs,
        )
    }

    fn build(base_url: String, login_path: String, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login_path,
        })
    }

    pub fn login_url(&self) -> String {
        self.url(&self.login_path)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST the credentials and interpret the reply.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<SessionToken, LoginError> {
        let url = self.login_url();
        debug!(url = %url, email = %request.email, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, JSON)
            .header(header::CONTENT_TYPE, JSON)
            .json(request)
            .send()
            .await
            .map_err(|e| LoginError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LoginError::from_transport(&e))?;

        let token = Self::interpret_login_response(status, &body)?;
        info!(
            status = status.as_u16(),
            token_type = token.token_type.as_deref().unwrap_or("unspecified"),
            "Login accepted"
        );
        Ok(token)
    }

    /// Map a login response to a token or a failure.
    pub fn interpret_login_response(status: StatusCode, body: &str) -> Result<SessionToken, LoginError> {
        if !status.is_success() {
            debug!(status = status.as_u16(), body = %truncate_body(body), "Login rejected");
            return Err(LoginError::from_status(status, body));
        }

        serde_json::from_str::<TokenResponse>(body)
            .ok()
            .and_then(TokenResponse::into_session_token)
            .ok_or(LoginError::MalformedResponse)
    }

    /// Probe `GET /health`
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.url(HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, JSON)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Health check returned {}: {}", status, truncate_body(&body));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

#[async_trait]
impl LoginTransport for AuthClient {
    async fn login(&self, request: LoginRequest) -> Result<SessionToken, LoginError> {
        self.authenticate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_joins_cleanly() {
        let client = AuthClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.login_url(), "http://localhost:8000/api/v1/auth/login");

        let mut config = Config::default();
        config.api_base_url = "https://api.nexohub.co".into();
        config.login_path = "auth/login".into();
        let client = AuthClient::from_config(&config).unwrap();
        assert_eq!(client.login_url(), "https://api.nexohub.co/auth/login");
    }

    #[test]
    fn test_interpret_success() {
        let token = AuthClient::interpret_login_response(StatusCode::OK, r#"{"access_token":"abc123"}"#)
            .unwrap();
        assert_eq!(token, SessionToken::new("abc123"));

        let token = AuthClient::interpret_login_response(
            StatusCode::OK,
            r#"{"access_token":"jwt","token_type":"bearer","expires_in":900,"user_id":3,"role":"driver"}"#,
        )
        .unwrap();
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        assert_eq!(token.role.as_deref(), Some("driver"));
    }

    #[test]
    fn test_interpret_success_drops_mistyped_extras() {
        for body in [
            r#"{"access_token":"abc123","user_id":"u-42"}"#,
            r#"{"access_token":"abc123","expires_in":900.5}"#,
            r#"{"access_token":"abc123","expires_in":-1}"#,
            r#"{"access_token":"abc123","token_type":1,"role":{"name":"admin"}}"#,
        ] {
            let token = AuthClient::interpret_login_response(StatusCode::OK, body)
                .unwrap_or_else(|e| panic!("body {body:?} gave {e:?}"));
            assert_eq!(token, SessionToken::new("abc123"), "body {body:?}");
        }

        let token = AuthClient::interpret_login_response(
            StatusCode::OK,
            r#"{"access_token":"abc123","user_id":"u-42","expires_in":900}"#,
        )
        .unwrap();
        assert_eq!(token.user_id, None);
        assert_eq!(token.expires_in, Some(900));
    }

    #[test]
    fn test_interpret_missing_or_empty_token() {
        for body in [
            "{}",
            r#"{"access_token":""}"#,
            r#"{"access_token":null}"#,
            r#"{"access_token":42}"#,
            "not json",
            "[]",
            "",
        ] {
            let result = AuthClient::interpret_login_response(StatusCode::OK, body);
            assert!(
                matches!(result, Err(LoginError::MalformedResponse)),
                "body {body:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_interpret_rejection_message() {
        let err = AuthClient::interpret_login_response(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Bad credentials"}"#,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Bad credentials");
        assert!(matches!(err, LoginError::RemoteRejection { status: 401, .. }));

        // A rejection is a rejection even if the body looks like a token
        let err = AuthClient::interpret_login_response(
            StatusCode::FORBIDDEN,
            r#"{"access_token":"abc"}"#,
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Unable to sign in.");
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            email: "user@example.com".into(),
            password: "password1".into(),
        };
        assert!(!format!("{:?}", request).contains("password1"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"email": "user@example.com", "password": "password1"})
        );
    }

    #[test]
    fn test_health_status() {
        let ok: HealthStatus = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(ok.is_ok());
        let degraded: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!degraded.is_ok());
    }
}
