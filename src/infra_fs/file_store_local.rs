use crate::domain_model::Locator;
use crate::domain_port::*;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Stores uploads under `<root>/<category>/<name>`. The locator is the path
/// relative to the root.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalFileStore { root: root.into() }
    }

    fn check_segment(segment: &str) -> Result<(), FileStoreError> {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !segment.contains(['/', '\\']) => Ok(()),
            _ => Err(FileStoreError::InvalidName(segment.to_string())),
        }
    }

    fn resolve(&self, locator: &Locator) -> Option<PathBuf> {
        let relative = Path::new(locator.0.as_str());
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        category: &str,
        name: &str,
        mut source: ByteSource,
    ) -> Result<Locator, FileStoreError> {
        Self::check_segment(category)?;
        Self::check_segment(name)?;

        let dir = self.root.join(category);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(name);
        let mut file = File::create(&path).await?;
        let written = match tokio::io::copy(&mut source, &mut file).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), "could not remove partial file: {}", cleanup);
                }
                return Err(e.into());
            }
        };
        file.flush().await?;
        file.sync_all().await?;
        debug!(path = %path.display(), written, "file written");

        Ok(Locator(format!("{}/{}", category, name)))
    }

    async fn open(&self, locator: &Locator) -> Result<Option<ByteSource>, FileStoreError> {
        let Some(path) = self.resolve(locator) else {
            return Ok(None);
        };
        match File::open(&path).await {
            Ok(file) => Ok(Some(Box::pin(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("folio-files-{}", uuid::Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn bytes_survive_a_round_trip_on_disk() {
        let root = temp_root();
        let store = LocalFileStore::new(&root);

        let locator = store
            .store(
                "resumes",
                "20240101_120000_abc_cv.pdf",
                Box::pin(std::io::Cursor::new(b"%PDF-1.4".to_vec())),
            )
            .await
            .unwrap();
        assert_eq!(locator.0, "resumes/20240101_120000_abc_cv.pdf");
        assert!(root.join("resumes/20240101_120000_abc_cv.pdf").is_file());

        let mut buf = Vec::new();
        store
            .open(&locator)
            .await
            .unwrap()
            .unwrap()
            .read_to_end(&mut buf)
            .await
            .unwrap();
        assert_eq!(buf, b"%PDF-1.4");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn missing_file_opens_as_none() {
        let store = LocalFileStore::new(temp_root());
        assert!(
            store
                .open(&Locator("resumes/missing.pdf".to_string()))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .open(&Locator("../outside.pdf".to_string()))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn path_segments_are_rejected() {
        let store = LocalFileStore::new(temp_root());
        for name in ["../cv.pdf", "a/b.pdf", "", ".."] {
            let result = store
                .store("resumes", name, Box::pin(std::io::Cursor::new(Vec::new())))
                .await;
            assert!(
                matches!(result, Err(FileStoreError::InvalidName(_))),
                "{:?} must be rejected",
                name
            );
        }
    }
}
