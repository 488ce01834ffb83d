//! Session credentials, the token store, and the sign-in client.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{compact_text, normalize_base_url};

/// Opaque bearer token proving an authenticated session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build a credential, treating blank tokens as absent.
    pub fn parse(token: Option<String>) -> Option<Self> {
        crate::util::normalize_text_option(token).map(Self)
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Credential([REDACTED])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(rename = "token")]
    pub credential: Credential,
    pub user: AuthUser,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Source of the current session credential.
///
/// Queried synchronously; implementations must not touch the network.
pub trait TokenStore: Send + Sync {
    fn is_authenticated(&self) -> Option<Credential>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn is_authenticated(&self) -> Option<Credential> {
        (**self).is_authenticated()
    }
}

/// Process-local token store. Sessions do not outlive the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    session: Arc<RwLock<Option<AuthSession>>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a bare token with no user details, e.g. from the environment.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        let store = Self::new();
        store.authenticate(AuthSession {
            credential,
            user: AuthUser {
                id: String::new(),
                name: None,
                email: None,
            },
        });
        store
    }

    pub fn authenticate(&self, session: AuthSession) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn is_authenticated(&self) -> Option<Credential> {
        self.session()
            .map(|session| session.credential)
            .filter(|credential| !credential.token().trim().is_empty())
    }
}

/// HTTP client for the `/auth/signin` endpoint.
#[derive(Debug, Clone)]
pub struct SignInClient {
    base_url: String,
    client: Client,
}

impl SignInClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> AuthResult<Self> {
        let base_url =
            normalize_base_url(base_url.as_ref()).map_err(AuthError::InvalidConfiguration)?;
        Ok(Self {
            base_url,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/auth/signin", self.base_url))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_sign_in_response(status, &body)
    }

    /// Sign in and place the resulting session in `store`.
    pub async fn sign_in_into(
        &self,
        store: &MemoryTokenStore,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthSession> {
        let session = self.sign_in(email, password).await?;
        store.authenticate(session.clone());
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::Api("Email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Api("Password is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
}

fn parse_sign_in_response(status: StatusCode, body: &str) -> AuthResult<AuthSession> {
    if let Ok(payload) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(message) = payload
            .error
            .or(payload.message)
            .filter(|message| !message.trim().is_empty())
        {
            return Err(AuthError::Api(message.trim().to_string()));
        }
    }

    if !status.is_success() {
        let trimmed = compact_text(body);
        return Err(AuthError::Api(if trimmed.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("{} ({})", trimmed, status.as_u16())
        }));
    }

    Ok(serde_json::from_str::<AuthSession>(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> AuthSession {
        AuthSession {
            credential: Credential::new(token),
            user: AuthUser {
                id: "u1".to_string(),
                name: Some("Ana".to_string()),
                email: Some("ana@example.com".to_string()),
            },
        }
    }

    #[test]
    fn credential_debug_redacts_token() {
        let rendered = format!("{:?}", session("secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn credential_parse_rejects_blank() {
        assert!(Credential::parse(None).is_none());
        assert!(Credential::parse(Some("  ".to_string())).is_none());
        assert_eq!(
            Credential::parse(Some(" tok ".to_string())).unwrap().token(),
            "tok"
        );
    }

    #[test]
    fn memory_store_reports_authentication() {
        let store = MemoryTokenStore::new();
        assert!(store.is_authenticated().is_none());

        store.authenticate(session("tok"));
        assert_eq!(store.is_authenticated().unwrap().token(), "tok");

        store.clear();
        assert!(store.is_authenticated().is_none());
    }

    #[test]
    fn memory_store_ignores_blank_token() {
        let store = MemoryTokenStore::with_credential(Credential::new(" "));
        assert!(store.is_authenticated().is_none());
    }

    #[test]
    fn sign_in_response_parses_session() {
        let body = r#"{"token":"jwt","user":{"_id":"u1","name":"Ana","email":"ana@example.com"}}"#;
        let parsed = parse_sign_in_response(StatusCode::OK, body).unwrap();
        assert_eq!(parsed, session("jwt"));
    }

    #[test]
    fn sign_in_response_surfaces_server_error() {
        let body = r#"{"error":"Email and password don't match."}"#;
        let error = parse_sign_in_response(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert_eq!(error.to_string(), "Email and password don't match.");
    }

    #[test]
    fn sign_in_response_reports_bare_status() {
        let error = parse_sign_in_response(StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_eq!(error.to_string(), "HTTP 502");
    }

    #[test]
    fn validate_credentials_requires_both_values() {
        assert!(validate_credentials("", "pw").is_err());
        assert!(validate_credentials("a@example.com", " ").is_err());
        assert!(validate_credentials("a@example.com", "pw").is_ok());
    }

    #[test]
    fn sign_in_client_rejects_invalid_base_url() {
        assert!(matches!(
            SignInClient::new("example.com", Duration::from_secs(1)),
            Err(AuthError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn sign_in_posts_json_and_stores_session() {
        let (base_url, captured) = crate::test_server::spawn_capturing_server(
            "200 OK",
            r#"{"token":"jwt","user":{"_id":"u1","name":"Ana","email":"ana@example.com"}}"#,
        )
        .await;
        let client = SignInClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let store = MemoryTokenStore::new();

        let signed_in = client
            .sign_in_into(&store, " ana@example.com ", "pw")
            .await
            .unwrap();

        assert_eq!(signed_in, session("jwt"));
        assert_eq!(store.is_authenticated().unwrap().token(), "jwt");

        let request = captured.await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/auth/signin");
        assert!(request
            .header("content-type")
            .is_some_and(|value| value.starts_with("application/json")));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email": "ana@example.com", "password": "pw"})
        );
    }

    #[tokio::test]
    async fn sign_in_rejection_leaves_store_empty() {
        let (base_url, _captured) = crate::test_server::spawn_capturing_server(
            "401 Unauthorized",
            r#"{"error":"Email and password don't match."}"#,
        )
        .await;
        let client = SignInClient::new(&base_url, Duration::from_secs(5)).unwrap();
        let store = MemoryTokenStore::new();

        let error = client
            .sign_in_into(&store, "ana@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "Email and password don't match.");
        assert!(store.is_authenticated().is_none());
    }
}
