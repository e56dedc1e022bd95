use super::util::{is_dup_key, store_err};
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::info;

/// `RecordStore` over a single MySQL table, one row per record key.
pub struct MySqlRecordStore {
    pool: MySqlPool,
}

impl MySqlRecordStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRecordStore { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS singleton_record (
    record_key VARCHAR(128) NOT NULL PRIMARY KEY,
    body       LONGTEXT NOT NULL,
    version    BIGINT UNSIGNED NOT NULL,
    updated_at TIMESTAMP(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3)
)
"#,
        )
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        info!("singleton_record table ready");
        Ok(())
    }

    fn row_to_record(row: MySqlRow) -> Result<VersionedRecord, StoreError> {
        let body: String = row.try_get("body").map_err(store_err)?;
        let version: u64 = row.try_get("version").map_err(store_err)?;
        Ok(VersionedRecord { body, version })
    }
}

#[async_trait::async_trait]
impl RecordStore for MySqlRecordStore {
    async fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT body, version
FROM singleton_record
WHERE record_key = ?
"#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn insert_if_absent(&self, key: &RecordKey, body: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
INSERT INTO singleton_record (record_key, body, version)
VALUES (?, ?, 1)
"#,
        )
        .bind(key.as_str())
        .bind(body)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_dup_key(&e) => Ok(false),
            Err(e) => Err(store_err(e)),
        }
    }

    async fn compare_and_swap(
        &self,
        key: &RecordKey,
        expected_version: u64,
        body: &str,
    ) -> Result<CasOutcome, StoreError> {
        let result = sqlx::query(
            r#"
UPDATE singleton_record
SET body = ?, version = version + 1
WHERE record_key = ? AND version = ?
"#,
        )
        .bind(body)
        .bind(key.as_str())
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(if result.rows_affected() == 1 {
            CasOutcome::Swapped
        } else {
            CasOutcome::Conflict
        })
    }
}
