use crate::domain_model::Locator;
use std::pin::Pin;
use tokio::io::AsyncRead;

pub type ByteSource = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
pub trait FileStore: Send + Sync {
    /// Persist every byte of `source` under `category/name`. Returns only once the
    /// bytes are fully written.
    async fn store(
        &self,
        category: &str,
        name: &str,
        source: ByteSource,
    ) -> Result<Locator, FileStoreError>;

    /// Open previously stored bytes. `None` if nothing is stored at `locator`.
    async fn open(&self, locator: &Locator) -> Result<Option<ByteSource>, FileStoreError>;
}
