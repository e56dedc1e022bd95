use super::record_mutation::*;
use crate::application_port::*;
use crate::domain_model::AdminIdentity;
use crate::domain_port::*;
use std::sync::Arc;

/// Admin credentials kept as a single record keyed by username.
pub struct RealCredentialStore {
    store: Arc<dyn RecordStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl RealCredentialStore {
    pub fn new(
        store: Arc<dyn RecordStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            credential_hasher,
            clock,
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for RealCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminIdentity>, AuthError> {
        let record = load_record::<AdminIdentity>(self.store.as_ref(), &RecordKey::admin(username))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(record.map(|(identity, _)| identity))
    }

    async fn bootstrap(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        if self.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let identity = AdminIdentity {
            username: username.to_string(),
            password_hash: self.credential_hasher.hash_password(password).await?,
            created_at: self.clock.now(),
        };
        insert_record_if_absent(self.store.as_ref(), &RecordKey::admin(username), &identity)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let Some(identity) = self.find_by_username(username).await? else {
            return Ok(false);
        };
        self.credential_hasher
            .verify_password(password, &identity.password_hash)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::Argon2PasswordHasher;
    use crate::infra_memory::{ManualClock, MemoryRecordStore};
    use chrono::Utc;

    fn credential_store() -> RealCredentialStore {
        RealCredentialStore::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(Argon2PasswordHasher),
            Arc::new(ManualClock::new(Utc::now())),
        )
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let store = credential_store();

        assert!(store.bootstrap("admin", "admin123").await.unwrap());
        let first = store.find_by_username("admin").await.unwrap().unwrap();

        assert!(!store.bootstrap("admin", "changed").await.unwrap());
        let second = store.find_by_username("admin").await.unwrap().unwrap();

        assert_eq!(first, second);
        assert!(store.verify("admin", "admin123").await.unwrap());
        assert!(!store.verify("admin", "changed").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_user_does_not_verify() {
        let store = credential_store();
        store.bootstrap("admin", "admin123").await.unwrap();
        assert!(store.find_by_username("root").await.unwrap().is_none());
        assert!(!store.verify("root", "admin123").await.unwrap());
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let store = credential_store();
        store.bootstrap("admin", "admin123").await.unwrap();
        let identity = store.find_by_username("admin").await.unwrap().unwrap();
        assert!(identity.password_hash.starts_with("$argon2"));
    }
}
