//! The signed-in user for this process.
//!
//! The bearer token lives in the client's [`TokenStore`](super::token::TokenStore); this
//! holder keeps the matching user record. A session exists only while both are present, so a
//! 401 anywhere (which clears the token) ends it.

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::{
    dto::{RegisterRequest, RegisterResponse, TokenResponse, User, UserPatch},
    token::{is_expired, token_expiry},
};
use crate::client::{ApiClient, ApiError};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Error)]
pub enum SessionError {
    /// User-facing reason: the server's `detail` when it sent one.
    #[error("{0}")]
    Failed(String),
    #[error("could not persist the session token: {0:#}")]
    Storage(anyhow::Error),
}

impl SessionError {
    fn from_api(err: &ApiError, fallback: &str) -> Self {
        SessionError::Failed(err.user_message(fallback))
    }
}

pub struct AuthSession {
    api: ApiClient,
    user: RwLock<Option<User>>,
}

impl AuthSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            user: RwLock::new(None),
        }
    }

    /// Restores the session from a stored token. Failures leave the process signed out.
    #[instrument(skip(self))]
    pub async fn init(&self) {
        let Some(token) = self.api.tokens().load().await else {
            return;
        };
        if is_expired(&token, OffsetDateTime::now_utc()) {
            info!("stored token already expired; discarding");
            self.discard().await;
            return;
        }
        match self.api.me().await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                *self.user.write().await = Some(user);
            }
            Err(e) => {
                warn!(error = %e, "stored token rejected; signing out");
                self.discard().await;
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        match self.api.login(email, password).await {
            Ok(response) => self.adopt(response).await,
            Err(e) => {
                warn!(error = %e, "login failed");
                Err(SessionError::from_api(&e, LOGIN_FAILED))
            }
        }
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User, SessionError> {
        match self.api.register(&request).await {
            Ok(RegisterResponse::Session(response)) => self.adopt(response).await,
            Ok(RegisterResponse::Account(account)) => {
                info!(user_id = account.id, "account created; signing in");
                match self.api.login(&request.email, &request.password).await {
                    Ok(response) => self.adopt(response).await,
                    Err(e) => {
                        warn!(error = %e, "sign-in after registration failed");
                        Err(SessionError::from_api(&e, REGISTER_FAILED))
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                Err(SessionError::from_api(&e, REGISTER_FAILED))
            }
        }
    }

    /// Swaps the current token for a fresh one.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<User, SessionError> {
        match self.api.refresh().await {
            Ok(response) => self.adopt(response).await,
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                if e.is_unauthorized() {
                    *self.user.write().await = None;
                }
                Err(SessionError::from_api(&e, SESSION_EXPIRED))
            }
        }
    }

    /// Refreshes a token that expires within `window`. Tokens without a readable expiry are
    /// left to the API to judge.
    #[instrument(skip(self))]
    pub async fn keep_alive(&self, window: time::Duration) {
        let Some(token) = self.api.tokens().load().await else {
            return;
        };
        let Some(expires) = token_expiry(&token) else {
            return;
        };
        if expires - OffsetDateTime::now_utc() > window {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "keep-alive refresh failed");
        }
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        let user = self.user.write().await.take();
        self.api.tokens().clear().await.map_err(SessionError::Storage)?;
        info!(user_id = user.map(|u| u.id), "signed out");
        Ok(())
    }

    /// Merges a partial record into the local copy; no server call.
    pub async fn update_user(&self, patch: UserPatch) {
        if let Some(user) = self.user.write().await.as_mut() {
            patch.apply(user);
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        if self.api.tokens().load().await.is_none() {
            let mut user = self.user.write().await;
            if let Some(lost) = user.take() {
                info!(user_id = lost.id, "token gone; session ended");
            }
            return None;
        }
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }

    async fn adopt(&self, response: TokenResponse) -> Result<User, SessionError> {
        self.api
            .tokens()
            .save(&response.access_token)
            .await
            .map_err(SessionError::Storage)?;
        info!(user_id = response.user.id, "signed in");
        *self.user.write().await = Some(response.user.clone());
        Ok(response.user)
    }

    async fn discard(&self) {
        *self.user.write().await = None;
        if let Err(e) = self.api.tokens().clear().await {
            warn!(error = %e, "failed to clear stored token");
        }
    }
}
