use crate::application_port::*;
use std::sync::Arc;
use tracing::debug;

const BEARER_SCHEME: &str = "bearer";

/// Resolves the admin identity from an `Authorization` header before any
/// protected operation runs.
#[derive(Clone)]
pub struct AccessGate {
    auth_service: Arc<dyn AuthService>,
}

impl AccessGate {
    pub fn new(auth_service: Arc<dyn AuthService>) -> Self {
        Self { auth_service }
    }

    /// Raw header bytes as they arrived. Bytes that are not a valid header string
    /// are refused the same way as any other malformed credential.
    pub async fn authenticate_header(
        &self,
        authorization: Option<&[u8]>,
    ) -> Result<String, AuthError> {
        let authorization = match authorization {
            Some(bytes) if !bytes.iter().all(is_header_text) => {
                return Err(AuthError::Unauthorized);
            }
            Some(bytes) => std::str::from_utf8(bytes).ok(),
            None => None,
        };
        self.authenticate(authorization).await
    }

    /// Credential failures (missing header, wrong scheme, bad signature, expiry,
    /// unknown subject) are reported as `Unauthorized`. Store failures pass through.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<String, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::Unauthorized)?;

        self.auth_service
            .verify_token(token)
            .await
            .map_err(|e| match e {
                AuthError::Store(_) | AuthError::InternalError(_) => e,
                other => {
                    debug!("bearer token refused: {}", other);
                    AuthError::Unauthorized
                }
            })
    }
}

fn is_header_text(b: &u8) -> bool {
    *b == b'\t' || (b' '..=b'~').contains(b)
}

/// The credentials of a `Bearer` header; the scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}
