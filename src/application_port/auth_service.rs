use crate::domain_model::AdminIdentity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Lifetime of tokens issued by the login flow.
pub const LOGIN_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("unauthorized")]
    Unauthorized,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub username: String,
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;

    /// Returns the token subject.
    async fn validate(&self, token: &AccessToken) -> Result<String, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminIdentity>, AuthError>;

    /// Create the admin identity unless one with this username already exists.
    /// Returns `true` if a new identity was written.
    async fn bootstrap(&self, username: &str, password: &str) -> Result<bool, AuthError>;

    async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<(), AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    /// Returns the authenticated username.
    async fn verify_token(&self, token: &str) -> Result<String, AuthError>;
}
