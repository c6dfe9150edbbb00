//! Supabase (GoTrue) authentication.
//!
//! [`AuthProvider`] is the capability the sync engine depends on;
//! [`SupabaseAuthClient`] implements it over the GoTrue REST API and keeps the
//! session in a pluggable [`SessionPersistence`].

use std::fmt;
use std::sync::{Arc, Mutex};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SupabaseConfig;
use crate::supabase::describe_api_error;
use crate::util::unix_timestamp_now;

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry (Unix seconds)
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth request: {0}")]
    InvalidRequest(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Session storage error: {0}")]
    SessionStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication capability used by the sync engine.
#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    /// Revoke the current session. Never touches local note data.
    async fn sign_out(&self) -> AuthResult<()>;

    /// The signed-in session, or `None` when nobody is signed in.
    async fn current_session(&self) -> AuthResult<Option<AuthSession>>;
}

/// Where the signed-in session lives between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session persistence.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }

    fn guard(&self) -> AuthResult<std::sync::MutexGuard<'_, Option<AuthSession>>> {
        self.session
            .lock()
            .map_err(|error| AuthError::SessionStorage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        Ok(self.guard()?.clone())
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        *self.guard()? = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        *self.guard()? = None;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(config: &SupabaseConfig, store: S) -> AuthResult<Self> {
        Ok(Self {
            auth_url: config.auth_url(),
            anon_key: config.anon_key().to_string(),
            client: Client::builder().build()?,
            store,
        })
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted session, refreshing it when expired.
    ///
    /// A session whose refresh fails is discarded.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored_session.is_expired() {
            return Ok(Some(stored_session));
        }

        match self.refresh_session(&stored_session.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidRequest("Refresh token must not be empty"));
        }

        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let request = self.public_request(
            self.client
                .post(format!("{}/token", self.auth_url))
                .query(&[("grant_type", "refresh_token")])
                .json(&payload),
        );
        let session = self
            .send_auth_request(request)
            .await?
            .into_session()?
            .ok_or_else(|| {
                AuthError::Api("Refresh response did not include an active session".to_string())
            })?;

        self.store.save_session(&session)?;
        Ok(session)
    }

    /// Revoke `access_token` on the server. An already-invalid token counts as
    /// revoked.
    pub async fn revoke(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(format!("{}/logout", self.auth_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Api(describe_api_error(status, &body)))
    }

    fn public_request(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn send_auth_request(&self, request: RequestBuilder) -> AuthResult<GoTrueResponse> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(describe_api_error(status, &body)));
        }
        Ok(response.json::<GoTrueResponse>().await?)
    }

    fn credentials_request(&self, path: &str, email: &str, password: &str) -> RequestBuilder {
        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        self.public_request(
            self.client
                .post(format!("{}/{path}", self.auth_url))
                .json(&payload),
        )
    }
}

impl<S: SessionPersistence> AuthProvider for SupabaseAuthClient<S> {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;

        let request = self.credentials_request("signup", email, password);
        match self.send_auth_request(request).await?.into_session()? {
            Some(session) => {
                self.store.save_session(&session)?;
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        validate_credentials(email, password)?;

        let request = self
            .credentials_request("token", email, password)
            .query(&[("grant_type", "password")]);
        let session = self
            .send_auth_request(request)
            .await?
            .into_session()?
            .ok_or_else(|| {
                AuthError::Api("Sign-in response did not include an active session".to_string())
            })?;

        self.store.save_session(&session)?;
        tracing::info!("Signed in as user {}", session.user.id);
        Ok(session)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let Some(session) = self.store.load_session()? else {
            return Ok(());
        };
        let revoked = self.revoke(&session.access_token).await;
        // The local session goes away even when the server could not be
        // reached; the token simply expires on its own.
        self.store.clear_session()?;
        revoked
    }

    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        self.restore_session().await
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidRequest("Email is required"));
    }
    if password.trim().is_empty() {
        return Err(AuthError::InvalidRequest("Password is required"));
    }
    Ok(())
}

/// GoTrue returns the session either flattened at the top level (`/token`)
/// or nested under `session` (`/signup`).
#[derive(Debug, Default, Deserialize)]
struct GoTrueResponse {
    #[serde(flatten)]
    tokens: GoTrueTokens,
    session: Option<GoTrueTokens>,
}

#[derive(Debug, Default, Deserialize)]
struct GoTrueTokens {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<GoTrueUser>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    email: Option<String>,
}

impl GoTrueTokens {
    fn or(self, fallback: Self) -> Self {
        Self {
            access_token: self.access_token.or(fallback.access_token),
            refresh_token: self.refresh_token.or(fallback.refresh_token),
            expires_at: self.expires_at.or(fallback.expires_at),
            expires_in: self.expires_in.or(fallback.expires_in),
            user: self.user.or(fallback.user),
        }
    }
}

impl GoTrueResponse {
    /// `Ok(None)` means the account exists but still needs email confirmation.
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let tokens = self.tokens.or(self.session.unwrap_or_default());
        let expires_at = tokens.expires_at.or_else(|| {
            tokens
                .expires_in
                .map(|expires_in| unix_timestamp_now().saturating_add(expires_in))
        });
        let user = tokens.user.map(|user| AuthUser {
            id: user.id,
            email: user.email,
        });

        match (tokens.access_token, tokens.refresh_token, expires_at, user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            (None, None, None, _) => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response did not include enough session fields".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: i64) -> AuthSession {
        AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at,
            user: AuthUser {
                id: "user".to_string(),
                email: None,
            },
        }
    }

    fn client(store: MemorySessionStore) -> SupabaseAuthClient<MemorySessionStore> {
        let config = SupabaseConfig::new("https://demo.supabase.co", "anon").unwrap();
        SupabaseAuthClient::new(&config, store).unwrap()
    }

    #[test]
    fn response_without_session_fields_means_confirmation_required() {
        let response: GoTrueResponse = serde_json::from_str(
            r#"{"id":"user","user":{"id":"user","email":"user@example.com"}}"#,
        )
        .unwrap();
        assert!(response.into_session().unwrap().is_none());
    }

    #[test]
    fn nested_session_is_accepted() {
        let response: GoTrueResponse = serde_json::from_str(
            r#"{"session":{"access_token":"a","refresh_token":"r","expires_in":3600,"user":{"id":"u1","email":null}}}"#,
        )
        .unwrap();
        let session = response.into_session().unwrap().unwrap();
        assert_eq!(session.user.id, "u1");
        assert!(!session.is_expired());
    }

    #[test]
    fn partial_session_is_rejected() {
        let response: GoTrueResponse =
            serde_json::from_str(r#"{"access_token":"a","user":{"id":"u1"}}"#).unwrap();
        assert!(response.into_session().is_err());
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let rendered = format!("{:?}", session(1_700_000_000));
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn current_session_returns_unexpired_stored_session() {
        let live = session(unix_timestamp_now() + 3_600);
        let auth = client(MemorySessionStore::with_session(live.clone()));
        assert_eq!(auth.current_session().await.unwrap(), Some(live));
    }

    #[tokio::test]
    async fn current_session_is_none_without_stored_session() {
        let auth = client(MemorySessionStore::default());
        assert_eq!(auth.current_session().await.unwrap(), None);
        auth.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn sign_in_validates_credentials_before_any_request() {
        let auth = client(MemorySessionStore::default());
        assert!(matches!(
            auth.sign_in(" ", "pw").await,
            Err(AuthError::InvalidRequest(_))
        ));
        assert!(matches!(
            auth.sign_up("me@example.com", "").await,
            Err(AuthError::InvalidRequest(_))
        ));
    }
}
