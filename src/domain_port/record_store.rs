use std::fmt;

/// Well-known key of a singleton record ("the only row").
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn portfolio() -> Self {
        RecordKey("portfolio".to_string())
    }

    pub fn documents() -> Self {
        RecordKey("documents".to_string())
    }

    pub fn admin(username: &str) -> Self {
        RecordKey(format!("admin:{}", username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored JSON body together with the version used for compare-and-swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub body: String,
    pub version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Swapped,
    /// The stored version moved on (or the record vanished) since it was read.
    Conflict,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Minimal document database contract: whole-record reads, insert-if-absent, and
/// atomic replacement guarded by the version read earlier.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, StoreError>;

    /// Returns `true` if the record was inserted, `false` if one already existed.
    async fn insert_if_absent(&self, key: &RecordKey, body: &str) -> Result<bool, StoreError>;

    async fn compare_and_swap(
        &self,
        key: &RecordKey,
        expected_version: u64,
        body: &str,
    ) -> Result<CasOutcome, StoreError>;
}
