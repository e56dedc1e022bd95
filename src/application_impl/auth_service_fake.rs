use crate::application_port::*;
use chrono::Utc;
use std::sync::RwLock;

const FAKE_TOKEN_PREFIX: &str = "fake-access-token:";

/// Accepts any password for the bootstrapped admin and issues readable tokens.
/// Local development only.
#[derive(Debug, Default)]
pub struct FakeAuthService {
    admin: RwLock<Option<String>>,
}

impl FakeAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_admin(&self, username: &str) -> bool {
        self.admin
            .read()
            .map(|admin| admin.as_deref() == Some(username))
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn bootstrap_admin(&self, username: &str, _password: &str) -> Result<(), AuthError> {
        let mut admin = self
            .admin
            .write()
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        admin.get_or_insert_with(|| username.to_string());
        Ok(())
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        if !self.is_admin(&request.username) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(LoginResult {
            token: AccessToken(format!("{}{}", FAKE_TOKEN_PREFIX, request.username)),
            expires_at: Utc::now() + LOGIN_TOKEN_TTL,
            username: request.username,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        match token.strip_prefix(FAKE_TOKEN_PREFIX) {
            Some(username) if self.is_admin(username) => Ok(username.to_string()),
            _ => Err(AuthError::TokenInvalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fake_tokens_round_trip_for_the_admin_only() {
        let service = FakeAuthService::new();
        service.bootstrap_admin("admin", "ignored").await.unwrap();

        let result = service
            .login(LoginInput {
                username: "admin".to_string(),
                password: "anything".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(service.verify_token(&result.token.0).await.unwrap(), "admin");

        assert!(service.verify_token("fake-access-token:root").await.is_err());
        assert!(service.verify_token("admin").await.is_err());
    }
}
