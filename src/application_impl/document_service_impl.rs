use super::record_mutation::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{info, warn};

const FALLBACK_FILENAME: &str = "upload";

pub struct RealDocumentService {
    store: Arc<dyn RecordStore>,
    file_store: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
}

impl RealDocumentService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        file_store: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            file_store,
            clock,
        }
    }

    async fn store_one(&self, file: UploadedFile) -> Result<DocumentFile, DocumentError> {
        let UploadedFile {
            slot,
            filename,
            content_type,
            source,
        } = file;

        if !slot.accepts(content_type.as_deref()) {
            return Err(DocumentError::InvalidFileType(slot));
        }

        let filename = sanitize_filename(&filename);
        let now = self.clock.now();
        let locator = self
            .file_store
            .store(slot.category(), &stored_name(now, &filename), source)
            .await
            .map_err(|e| match e {
                FileStoreError::Io(e) if e.kind() == ErrorKind::InvalidData => {
                    DocumentError::MalformedUpload(e.to_string())
                }
                e => DocumentError::Store(e.to_string()),
            })?;

        let entry = DocumentFile {
            filename,
            locator,
            uploaded_at: Some(now),
        };
        self.record_slot(slot, entry.clone()).await?;
        info!(%slot, locator = %entry.locator, "document stored");
        Ok(entry)
    }

    async fn record_slot(&self, slot: DocumentSlot, entry: DocumentFile) -> Result<(), DocumentError> {
        self.initialize_if_absent().await?;
        mutate_record::<DocumentRegistry, (), DocumentError, _>(
            self.store.as_ref(),
            &RecordKey::documents(),
            |registry| {
                *registry.slot_mut(slot) = entry.clone();
                Ok(())
            },
        )
        .await
        .map_err(|e| match e {
            MutationError::Missing => DocumentError::NotFound,
            MutationError::Rejected(e) => e,
            other => DocumentError::Store(other.to_string()),
        })
    }
}

/// Keep only the final path component of a client-supplied filename.
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        base => base.to_string(),
    }
}

fn stored_name(now: DateTime<Utc>, filename: &str) -> String {
    format!(
        "{}_{}_{}",
        now.format("%Y%m%d_%H%M%S"),
        nanoid::nanoid!(10),
        filename
    )
}

#[async_trait::async_trait]
impl DocumentService for RealDocumentService {
    async fn get(&self) -> Result<DocumentRegistry, DocumentError> {
        load_record::<DocumentRegistry>(self.store.as_ref(), &RecordKey::documents())
            .await
            .map_err(|e| DocumentError::Store(e.to_string()))?
            .map(|(registry, _)| registry)
            .ok_or(DocumentError::NotFound)
    }

    async fn initialize_if_absent(&self) -> Result<bool, DocumentError> {
        insert_record_if_absent(
            self.store.as_ref(),
            &RecordKey::documents(),
            &DocumentRegistry::default(),
        )
        .await
        .map_err(|e| DocumentError::Store(e.to_string()))
    }

    async fn store_files(&self, mut files: UploadStream) -> Result<UploadReport, DocumentError> {
        let mut received = 0usize;
        let mut report = UploadReport::default();
        let mut last_rejection = None;
        while let Some(file) = files.try_next().await? {
            received += 1;
            let slot = file.slot;
            let original = file.filename.clone();
            match self.store_one(file).await {
                Ok(entry) => {
                    report
                        .uploaded_files
                        .insert(slot.field_name().to_string(), entry.filename);
                }
                Err(e @ DocumentError::InvalidFileType(_)) => {
                    warn!(%slot, filename = %original, "upload rejected: {}", e);
                    report
                        .rejected_files
                        .insert(slot.field_name().to_string(), e.to_string());
                    last_rejection = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        if received == 0 {
            return Err(DocumentError::NoFilesProvided);
        }
        match last_rejection {
            Some(e) if report.uploaded_files.is_empty() => Err(e),
            _ => Ok(report),
        }
    }

    async fn resolve_download(&self, slot_key: &str) -> Result<Download, DocumentError> {
        let slot = DocumentSlot::from_public_key(slot_key)
            .ok_or_else(|| DocumentError::InvalidKind(slot_key.to_string()))?;

        let registry = self.get().await?;
        let entry = registry.slot(slot);
        if entry.is_empty() {
            return Err(DocumentError::NotFound);
        }

        let source = self
            .file_store
            .open(&entry.locator)
            .await
            .map_err(|e| DocumentError::Store(e.to_string()))?
            .ok_or_else(|| {
                warn!(%slot, locator = %entry.locator, "registered document missing from storage");
                DocumentError::NotFound
            })?;

        Ok(Download {
            source,
            filename: entry.filename.clone(),
            content_type: slot.mime_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::{ManualClock, MemoryFileStore, MemoryRecordStore};
    use futures_util::StreamExt;
    use tokio::io::AsyncReadExt;
    use tokio_util::io::StreamReader;

    struct Fixture {
        service: RealDocumentService,
        files: Arc<MemoryFileStore>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let files = Arc::new(MemoryFileStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = RealDocumentService::new(
            Arc::new(MemoryRecordStore::new()),
            files.clone(),
            clock.clone(),
        );
        Fixture {
            service,
            files,
            clock,
        }
    }

    fn upload(slot: DocumentSlot, filename: &str, content_type: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            slot,
            filename: filename.to_string(),
            content_type: Some(content_type.to_string()),
            source: Box::pin(std::io::Cursor::new(bytes.to_vec())),
        }
    }

    fn files(list: Vec<UploadedFile>) -> UploadStream {
        futures_util::stream::iter(list.into_iter().map(Ok)).boxed()
    }

    async fn read_all(mut source: ByteSource) -> Vec<u8> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn stored_pdf_downloads_with_same_bytes_and_name() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();

        let report = f
            .service
            .store_files(files(vec![upload(
                DocumentSlot::ResumePdf,
                "cv.pdf",
                PDF_MIME,
                b"%PDF-1.7 body",
            )]))
            .await
            .unwrap();
        assert_eq!(report.uploaded_files["resumePDF"], "cv.pdf");
        assert!(report.rejected_files.is_empty());

        let download = f.service.resolve_download("resume-pdf").await.unwrap();
        assert_eq!(download.filename, "cv.pdf");
        assert_eq!(download.content_type, PDF_MIME);
        assert_eq!(read_all(download.source).await, b"%PDF-1.7 body");

        let registry = f.service.get().await.unwrap();
        assert_eq!(registry.resume_pdf.uploaded_at, Some(f.clock.now()));
        assert!(registry.resume_docx.is_empty());
    }

    #[tokio::test]
    async fn docx_in_pdf_slot_is_invalid_file_type() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();

        let err = f
            .service
            .store_files(files(vec![upload(
                DocumentSlot::ResumePdf,
                "cv.docx",
                DOCX_MIME,
                b"PK",
            )]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidFileType(DocumentSlot::ResumePdf)
        ));
        assert!(f.files.is_empty());
        assert!(f.service.get().await.unwrap().resume_pdf.is_empty());
    }

    #[tokio::test]
    async fn slots_are_validated_independently() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();

        let report = f
            .service
            .store_files(files(vec![
                upload(DocumentSlot::CoverLetterDocx, "letter.docx", DOCX_MIME, b"PK"),
                upload(DocumentSlot::CoverLetterPdf, "letter.txt", "text/plain", b"hi"),
            ]))
            .await
            .unwrap();

        assert_eq!(report.uploaded_files["coverLetterDOCX"], "letter.docx");
        assert!(report.rejected_files.contains_key("coverLetterPDF"));

        let registry = f.service.get().await.unwrap();
        assert_eq!(registry.cover_letter_docx.filename, "letter.docx");
        assert!(registry.cover_letter_pdf.is_empty());
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.service.store_files(files(Vec::new())).await,
            Err(DocumentError::NoFilesProvided)
        ));
    }

    #[tokio::test]
    async fn upload_overwrites_only_its_own_slot() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();
        f.service
            .store_files(files(vec![
                upload(DocumentSlot::ResumePdf, "old.pdf", PDF_MIME, b"old"),
                upload(DocumentSlot::ResumeDocx, "cv.docx", DOCX_MIME, b"docx"),
            ]))
            .await
            .unwrap();

        f.service
            .store_files(files(vec![upload(DocumentSlot::ResumePdf, "new.pdf", PDF_MIME, b"new")]))
            .await
            .unwrap();

        let registry = f.service.get().await.unwrap();
        assert_eq!(registry.resume_pdf.filename, "new.pdf");
        assert_eq!(registry.resume_docx.filename, "cv.docx");
        let download = f.service.resolve_download("resume-pdf").await.unwrap();
        assert_eq!(read_all(download.source).await, b"new");
    }

    #[tokio::test]
    async fn upload_creates_missing_registry() {
        let f = fixture();
        f.service
            .store_files(files(vec![upload(DocumentSlot::ResumeDocx, "cv.docx", DOCX_MIME, b"PK")]))
            .await
            .unwrap();
        assert_eq!(f.service.get().await.unwrap().resume_docx.filename, "cv.docx");
    }

    #[tokio::test]
    async fn report_uses_the_stored_filename() {
        let f = fixture();
        let report = f
            .service
            .store_files(files(vec![upload(
                DocumentSlot::ResumePdf,
                "../drafts/cv.pdf",
                PDF_MIME,
                b"%PDF",
            )]))
            .await
            .unwrap();

        let registry = f.service.get().await.unwrap();
        assert_eq!(registry.resume_pdf.filename, "cv.pdf");
        assert_eq!(report.uploaded_files["resumePDF"], registry.resume_pdf.filename);
    }

    #[tokio::test]
    async fn truncated_part_is_malformed_and_not_registered() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();

        let chunks: Vec<Result<&'static [u8], std::io::Error>> = vec![
            Ok(&b"%PDF-1.7 partial"[..]),
            Err(std::io::Error::new(ErrorKind::InvalidData, "stream ended early")),
        ];
        let broken = UploadedFile {
            slot: DocumentSlot::ResumePdf,
            filename: "cv.pdf".to_string(),
            content_type: Some(PDF_MIME.to_string()),
            source: Box::pin(StreamReader::new(futures_util::stream::iter(chunks))),
        };

        let err = f.service.store_files(files(vec![broken])).await.unwrap_err();
        assert!(matches!(err, DocumentError::MalformedUpload(_)));
        assert!(f.service.get().await.unwrap().resume_pdf.is_empty());
    }

    #[tokio::test]
    async fn stream_error_stops_the_upload() {
        let f = fixture();
        let parts = futures_util::stream::iter(vec![
            Ok(upload(DocumentSlot::ResumePdf, "cv.pdf", PDF_MIME, b"%PDF")),
            Err(DocumentError::MalformedUpload("boundary missing".to_string())),
            Ok(upload(DocumentSlot::ResumeDocx, "cv.docx", DOCX_MIME, b"PK")),
        ])
        .boxed();

        let err = f.service.store_files(parts).await.unwrap_err();
        assert!(matches!(err, DocumentError::MalformedUpload(_)));
        assert!(f.service.get().await.unwrap().resume_docx.is_empty());
    }

    #[tokio::test]
    async fn download_failures() {
        let f = fixture();
        f.service.initialize_if_absent().await.unwrap();

        assert!(matches!(
            f.service.resolve_download("resume").await,
            Err(DocumentError::InvalidKind(_))
        ));
        assert!(matches!(
            f.service.resolve_download("cover-letter-pdf").await,
            Err(DocumentError::NotFound)
        ));

        f.service
            .store_files(files(vec![upload(DocumentSlot::ResumePdf, "cv.pdf", PDF_MIME, b"x")]))
            .await
            .unwrap();
        let locator = f.service.get().await.unwrap().resume_pdf.locator;
        f.files.remove(&locator);
        assert!(matches!(
            f.service.resolve_download("resume-pdf").await,
            Err(DocumentError::NotFound)
        ));
    }

    #[test]
    fn filenames_are_reduced_to_their_base() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cv.pdf"), "cv.pdf");
        assert_eq!(sanitize_filename("dir/"), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename("cv.pdf"), "cv.pdf");
    }

    #[test]
    fn stored_names_are_timestamped_and_unique() {
        let now = Utc::now();
        let a = stored_name(now, "cv.pdf");
        let b = stored_name(now, "cv.pdf");
        assert_ne!(a, b);
        assert!(a.starts_with(&now.format("%Y%m%d_%H%M%S").to_string()));
        assert!(a.ends_with("_cv.pdf"));
    }
}
