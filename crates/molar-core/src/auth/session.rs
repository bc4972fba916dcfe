//! Session lifecycle: restore, login, register, logout, profile updates.
//!
//! `SessionStore` is the single source of truth for authentication state.
//! Its operations never panic and never leak transport errors raw: every
//! failure carries one human-readable message extracted from the server's
//! error payload. Status transitions are observable through a watch
//! channel so a caller can route to its login entry point when the
//! session is forcibly cleared.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ApiError, Gateway};
use crate::config::Config;
use crate::models::{PasswordChange, ProfileUpdate, Registration, TokenPair, User};

use super::tokens::TokenStore;

/// Fallback messages when the server error payload yields nothing usable
const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
const PROFILE_FALLBACK: &str = "Profile update failed. Please try again.";
const PASSWORD_FALLBACK: &str = "Password change failed. Please try again.";

/// Minimum password length accepted before a registration call is made
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A persisted token is being validated at startup.
    Restoring,
    Authenticated,
    Anonymous,
}

/// Failure of an auth-facing operation. `message()` is displayable as-is.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input rejected before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// The server rejected the operation.
    #[error("{message}")]
    Server {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl AuthError {
    pub fn message(&self) -> &str {
        match self {
            AuthError::Validation(message) => message,
            AuthError::Server { message, .. } => message,
        }
    }

    fn server(source: ApiError, fallback: &str) -> Self {
        let message = source
            .user_message()
            .unwrap_or_else(|| fallback.to_string());
        AuthError::Server { message, source }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
    tokens: TokenPair,
}

struct SessionInner {
    user: Option<User>,
    status: SessionStatus,
}

/// Shared view of the session, held by the store and the gateway.
///
/// Invariant: `user` is present if and only if status is `Authenticated`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionInner>>,
    status_tx: Arc<watch::Sender<SessionStatus>>,
    tokens: Arc<dyn TokenStore>,
}

impl SessionHandle {
    pub(crate) fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Restoring);
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                user: None,
                status: SessionStatus::Restoring,
            })),
            status_tx: Arc::new(status_tx),
            tokens,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    pub fn user(&self) -> Option<User> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Observe status transitions, e.g. to route to login on forced logout.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.access_token()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens.refresh_token()
    }

    pub(crate) fn persist_pair(&self, pair: &TokenPair) {
        if let Err(err) = self.tokens.store_pair(&pair.access, &pair.refresh) {
            warn!(error = %err, "failed to persist token pair");
        }
    }

    pub(crate) fn persist_access(&self, access: &str) {
        if let Err(err) = self.tokens.store_access(access) {
            warn!(error = %err, "failed to persist refreshed access token");
        }
    }

    pub(crate) fn set_authenticated(&self, user: User) {
        self.transition(Some(user), SessionStatus::Authenticated);
    }

    /// Replace the profile without touching status or tokens.
    pub(crate) fn set_user(&self, user: User) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.user = Some(user);
    }

    /// Forced logout: drop durable tokens and in-memory state.
    pub(crate) fn clear(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "failed to clear token storage");
        }
        self.transition(None, SessionStatus::Anonymous);
    }

    fn transition(&self, user: Option<User>, status: SessionStatus) {
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.user = user;
            inner.status = status;
        }
        self.status_tx.send_replace(status);
    }
}

/// Single source of truth for authentication state.
pub struct SessionStore {
    gateway: Gateway,
    session: SessionHandle,
}

impl SessionStore {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let session = SessionHandle::new(tokens);
        let gateway = Gateway::new(config, session.clone())?;
        Ok(Self { gateway, session })
    }

    /// Gateway sharing this store's session, for the typed API surfaces.
    pub fn gateway(&self) -> Gateway {
        self.gateway.clone()
    }

    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.session.subscribe()
    }

    /// Validate a persisted token at startup. Ends `Authenticated` when the
    /// profile fetch succeeds, `Anonymous` (with storage cleared) otherwise.
    /// Call once; never retried.
    pub async fn restore(&self) -> SessionStatus {
        if self.session.access_token().is_none() {
            debug!("no persisted access token, starting anonymous");
            self.session.clear();
            return SessionStatus::Anonymous;
        }

        match self.gateway.get::<User>("/auth/profile/").await {
            Ok(user) => {
                debug!(user = %user.email, "session restored from persisted token");
                self.session.set_authenticated(user);
                SessionStatus::Authenticated
            }
            Err(err) => {
                debug!(error = %err, "session restore failed, clearing persisted tokens");
                self.session.clear();
                SessionStatus::Anonymous
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required.".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required.".to_string()));
        }

        let body = json!({"email": email.trim(), "password": password});
        match self.gateway.post::<AuthResponse, _>("/auth/login/", &body).await {
            Ok(response) => {
                self.session.persist_pair(&response.tokens);
                self.session.set_authenticated(response.user.clone());
                Ok(response.user)
            }
            Err(source) => Err(AuthError::server(source, LOGIN_FALLBACK)),
        }
    }

    pub async fn register(&self, registration: &Registration) -> Result<User, AuthError> {
        if registration.username.trim().len() < 2 {
            return Err(AuthError::Validation(
                "Username must be at least 2 characters.".to_string(),
            ));
        }
        if !registration.email.contains('@') {
            return Err(AuthError::Validation(
                "A valid email address is required.".to_string(),
            ));
        }
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters.".to_string(),
            ));
        }
        if registration.password != registration.password_confirm {
            return Err(AuthError::Validation(
                "Passwords do not match.".to_string(),
            ));
        }

        match self
            .gateway
            .post::<AuthResponse, _>("/auth/register/", registration)
            .await
        {
            Ok(response) => {
                self.session.persist_pair(&response.tokens);
                self.session.set_authenticated(response.user.clone());
                Ok(response.user)
            }
            Err(source) => Err(AuthError::server(source, REGISTER_FALLBACK)),
        }
    }

    /// Clears the session unconditionally. Idempotent; storage failures
    /// are logged, never surfaced.
    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, AuthError> {
        match self.gateway.patch::<User, _>("/auth/profile/", update).await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(source) => Err(AuthError::server(source, PROFILE_FALLBACK)),
        }
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), AuthError> {
        if change.new_password != change.new_password_confirm {
            return Err(AuthError::Validation(
                "New passwords do not match.".to_string(),
            ));
        }

        self.gateway
            .post_unit("/auth/change-password/", change)
            .await
            .map_err(|source| AuthError::server(source, PASSWORD_FALLBACK))
    }
}
