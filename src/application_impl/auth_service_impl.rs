use crate::application_port::*;
use crate::domain_port::Clock;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let argon2 = argon2::Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {}", e))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String, // admin username
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String,
}

/// HS256 bearer tokens. Expiry is checked against the injected clock rather than
/// the library's wall clock so that it can be driven in tests.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
    clock: Arc<dyn Clock>,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        JwtHs256Codec { cfg, clock }
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        v.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);
        v
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let iat_dt = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        let exp_dt = iat_dt + ttl;
        let claims = AccessClaims {
            sub: subject.to_string(),
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Self::gen_jti(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn validate(&self, token: &AccessToken) -> Result<String, AuthError> {
        let data = decode::<AccessClaims>(
            &token.0,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &self.validation(),
        )
        .map_err(|e| {
            debug!("token rejected: {}", e);
            AuthError::TokenInvalid
        })?;

        if self.clock.now().timestamp() > data.claims.exp {
            return Err(AuthError::TokenExpired);
        }
        Ok(data.claims.sub)
    }
}

pub struct RealAuthService {
    credential_store: Arc<dyn CredentialStore>,
    token_codec: Arc<dyn TokenCodec>,
}

impl RealAuthService {
    pub fn new(credential_store: Arc<dyn CredentialStore>, token_codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            credential_store,
            token_codec,
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.credential_store.bootstrap(username, password).await? {
            info!(username, "default admin user created");
        }
        Ok(())
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { username, password } = request;

        if !self.credential_store.verify(&username, &password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let (token, expires_at) = self.token_codec.issue(&username, LOGIN_TOKEN_TTL).await?;

        Ok(LoginResult {
            username,
            token,
            expires_at,
        })
    }

    async fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        let subject = self
            .token_codec
            .validate(&AccessToken(token.to_string()))
            .await?;

        // A token signed for an identity that no longer exists is not honoured.
        if self
            .credential_store
            .find_by_username(&subject)
            .await?
            .is_none()
        {
            return Err(AuthError::TokenInvalid);
        }

        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::RealCredentialStore;
    use crate::infra_memory::{ManualClock, MemoryRecordStore};

    fn codec(clock: Arc<ManualClock>, key: &str) -> JwtHs256Codec {
        JwtHs256Codec::new(
            JwtConfig {
                issuer: "folio.auth".to_string(),
                audience: "folio-admin".to_string(),
                signing_key: key.as_bytes().to_vec(),
            },
            clock,
        )
    }

    #[tokio::test]
    async fn token_is_valid_until_ttl_elapses() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let codec = codec(clock.clone(), "secret");
        let ttl = Duration::from_secs(60);

        let (token, expires_at) = codec.issue("admin", ttl).await.unwrap();
        assert_eq!(codec.validate(&token).await.unwrap(), "admin");

        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.now().timestamp(), expires_at.timestamp());
        assert_eq!(codec.validate(&token).await.unwrap(), "admin");

        clock.advance(Duration::from_secs(1));
        assert!(matches!(
            codec.validate(&token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn foreign_signature_and_garbage_are_rejected() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ours = codec(clock.clone(), "secret");
        let theirs = codec(clock, "other-secret");

        let (token, _) = theirs.issue("admin", LOGIN_TOKEN_TTL).await.unwrap();
        assert!(matches!(
            ours.validate(&token).await,
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(
            ours.validate(&AccessToken("not.a.token".to_string())).await,
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("admin123").await.unwrap();
        assert_ne!(hash, "admin123");
        assert!(hasher.verify_password("admin123", &hash).await.unwrap());
        assert!(!hasher.verify_password("admin124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn login_issues_a_day_long_token() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(RealCredentialStore::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(Argon2PasswordHasher),
            clock.clone(),
        ));
        let service = RealAuthService::new(store, Arc::new(codec(clock.clone(), "secret")));
        service.bootstrap_admin("admin", "admin123").await.unwrap();

        let result = service
            .login(LoginInput {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            (result.expires_at - clock.now()).num_hours(),
            24,
            "login tokens live for 24 hours"
        );
        assert_eq!(service.verify_token(&result.token.0).await.unwrap(), "admin");

        clock.advance(LOGIN_TOKEN_TTL + Duration::from_secs(1));
        assert!(service.verify_token(&result.token.0).await.is_err());
    }

    #[tokio::test]
    async fn login_with_wrong_password_or_user_fails() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(RealCredentialStore::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(Argon2PasswordHasher),
            clock.clone(),
        ));
        let service = RealAuthService::new(store, Arc::new(codec(clock, "secret")));
        service.bootstrap_admin("admin", "admin123").await.unwrap();

        for (username, password) in [("admin", "wrong"), ("nobody", "admin123")] {
            let result = service
                .login(LoginInput {
                    username: username.to_string(),
                    password: password.to_string(),
                })
                .await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
    }
}
