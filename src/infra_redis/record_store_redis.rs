use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::Script;

const INSERT_IF_ABSENT: &str = include_str!("insert_if_absent.lua");
const COMPARE_AND_SWAP: &str = include_str!("compare_and_swap.lua");

/// `RecordStore` keeping each record as a hash `{body, version}` under
/// `<prefix>:<record key>`.
pub struct RedisRecordStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisRecordStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRecordStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &RecordKey) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl RecordStore for RedisRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let (body, version): (Option<String>, Option<u64>) = redis::cmd("HMGET")
            .arg(self.key(key))
            .arg("body")
            .arg("version")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match (body, version) {
            (Some(body), Some(version)) => Ok(Some(VersionedRecord { body, version })),
            (None, None) => Ok(None),
            _ => Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: "incomplete record hash".to_string(),
            }),
        }
    }

    async fn insert_if_absent(&self, key: &RecordKey, body: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let inserted: i64 = Script::new(INSERT_IF_ABSENT)
            .key(self.key(key))
            .arg(body)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(inserted == 1)
    }

    async fn compare_and_swap(
        &self,
        key: &RecordKey,
        expected_version: u64,
        body: &str,
    ) -> Result<CasOutcome, StoreError> {
        let mut conn = self.conn.clone();
        let swapped: i64 = Script::new(COMPARE_AND_SWAP)
            .key(self.key(key))
            .arg(expected_version)
            .arg(body)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(if swapped == 1 {
            CasOutcome::Swapped
        } else {
            CasOutcome::Conflict
        })
    }
}
