use crate::domain_port::*;
use dashmap::DashMap;

/// Process-local `RecordStore`. Every operation on a key happens under that key's
/// shard lock, so insert-if-absent and compare-and-swap are atomic.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, VersionedRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        Ok(self.records.get(key.as_str()).map(|r| r.value().clone()))
    }

    async fn insert_if_absent(&self, key: &RecordKey, body: &str) -> Result<bool, StoreError> {
        let mut inserted = false;
        self.records
            .entry(key.as_str().to_owned())
            .or_insert_with(|| {
                inserted = true;
                VersionedRecord {
                    body: body.to_owned(),
                    version: 1,
                }
            });
        Ok(inserted)
    }

    async fn compare_and_swap(
        &self,
        key: &RecordKey,
        expected_version: u64,
        body: &str,
    ) -> Result<CasOutcome, StoreError> {
        match self.records.get_mut(key.as_str()) {
            Some(mut record) if record.version == expected_version => {
                body.clone_into(&mut record.body);
                record.version += 1;
                Ok(CasOutcome::Swapped)
            }
            _ => Ok(CasOutcome::Conflict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_only_once() {
        let store = MemoryRecordStore::new();
        let key = RecordKey::portfolio();

        assert!(store.insert_if_absent(&key, "a").await.unwrap());
        assert!(!store.insert_if_absent(&key, "b").await.unwrap());

        let record = store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.body, "a");
        assert_eq!(record.version, 1);
    }

    #[tokio::test]
    async fn swap_requires_current_version() {
        let store = MemoryRecordStore::new();
        let key = RecordKey::documents();
        store.insert_if_absent(&key, "v1").await.unwrap();

        assert_eq!(
            store.compare_and_swap(&key, 1, "v2").await.unwrap(),
            CasOutcome::Swapped
        );
        assert_eq!(
            store.compare_and_swap(&key, 1, "stale").await.unwrap(),
            CasOutcome::Conflict
        );

        let record = store.get(&key).await.unwrap().unwrap();
        assert_eq!(record.body, "v2");
        assert_eq!(record.version, 2);
    }

    #[tokio::test]
    async fn swap_on_missing_record_conflicts() {
        let store = MemoryRecordStore::new();
        assert_eq!(
            store
                .compare_and_swap(&RecordKey::admin("admin"), 1, "x")
                .await
                .unwrap(),
            CasOutcome::Conflict
        );
        assert!(store.get(&RecordKey::admin("admin")).await.unwrap().is_none());
    }
}
