use crate::domain_port::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Attempts before giving up on a record that keeps changing underneath us.
const MAX_CAS_ATTEMPTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum MutationError<E> {
    #[error("record not found")]
    Missing,
    #[error("rejected: {0:?}")]
    Rejected(E),
    #[error("store contention on {0}")]
    Contention(RecordKey),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn load_record<T: DeserializeOwned>(
    store: &dyn RecordStore,
    key: &RecordKey,
) -> Result<Option<(T, u64)>, StoreError> {
    let Some(record) = store.get(key).await? else {
        return Ok(None);
    };
    let value = decode(key, &record.body)?;
    Ok(Some((value, record.version)))
}

pub async fn insert_record_if_absent<T: Serialize>(
    store: &dyn RecordStore,
    key: &RecordKey,
    value: &T,
) -> Result<bool, StoreError> {
    let body = encode(key, value)?;
    store.insert_if_absent(key, &body).await
}

/// Load, mutate in memory, and write back with compare-and-swap. On a version conflict
/// the mutation is re-applied to the fresh record. An `Err` from `mutate` aborts
/// without writing anything.
pub async fn mutate_record<T, R, E, F>(
    store: &dyn RecordStore,
    key: &RecordKey,
    mut mutate: F,
) -> Result<R, MutationError<E>>
where
    T: Serialize + DeserializeOwned,
    F: FnMut(&mut T) -> Result<R, E>,
{
    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let (mut value, version) = load_record::<T>(store, key)
            .await?
            .ok_or(MutationError::Missing)?;

        let outcome = mutate(&mut value).map_err(MutationError::Rejected)?;
        let body = encode(key, &value)?;

        match store.compare_and_swap(key, version, &body).await? {
            CasOutcome::Swapped => return Ok(outcome),
            CasOutcome::Conflict => {
                debug!(%key, attempt, version, "record changed concurrently, retrying");
            }
        }
    }

    Err(MutationError::Contention(key.clone()))
}

fn decode<T: DeserializeOwned>(key: &RecordKey, body: &str) -> Result<T, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(key: &RecordKey, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
