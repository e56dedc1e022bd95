use crate::domain_model::Locator;
use crate::domain_port::*;
use dashmap::DashMap;
use tokio::io::AsyncReadExt;

const MEMORY_SCHEME: &str = "mem://";

/// Keeps uploaded bytes in memory. Used when no upload directory is configured
/// and by tests.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: DashMap<Locator, Vec<u8>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn remove(&self, locator: &Locator) -> Option<Vec<u8>> {
        self.files.remove(locator).map(|(_, bytes)| bytes)
    }
}

#[async_trait::async_trait]
impl FileStore for MemoryFileStore {
    async fn store(
        &self,
        category: &str,
        name: &str,
        mut source: ByteSource,
    ) -> Result<Locator, FileStoreError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }

        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).await?;

        let locator = Locator(format!("{}{}/{}", MEMORY_SCHEME, category, name));
        self.files.insert(locator.clone(), bytes);
        Ok(locator)
    }

    async fn open(&self, locator: &Locator) -> Result<Option<ByteSource>, FileStoreError> {
        Ok(self.files.get(locator).map(|bytes| {
            let source: ByteSource = Box::pin(std::io::Cursor::new(bytes.value().clone()));
            source
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_bytes_can_be_reopened() {
        let store = MemoryFileStore::new();
        let locator = store
            .store("resumes", "cv.pdf", Box::pin(std::io::Cursor::new(b"%PDF".to_vec())))
            .await
            .unwrap();
        assert_eq!(locator.0, "mem://resumes/cv.pdf");

        let mut buf = Vec::new();
        store
            .open(&locator)
            .await
            .unwrap()
            .unwrap()
            .read_to_end(&mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"%PDF");

        assert!(store.open(&Locator("mem://resumes/other".into())).await.unwrap().is_none());
    }
}
