use crate::domain_model::*;
use crate::domain_port::ByteSource;
use futures_util::stream::BoxStream;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document not found")]
    NotFound,
    #[error("invalid file type for {0}")]
    InvalidFileType(DocumentSlot),
    #[error("invalid document type: {0}")]
    InvalidKind(String),
    #[error("no files uploaded")]
    NoFilesProvided,
    #[error("malformed upload: {0}")]
    MalformedUpload(String),
    #[error("store error: {0}")]
    Store(String),
}

/// One file part of an upload request.
pub struct UploadedFile {
    pub slot: DocumentSlot,
    pub filename: String,
    pub content_type: Option<String>,
    pub source: ByteSource,
}

/// Upload parts in arrival order. Each file's bytes must be consumed before the
/// next item is pulled.
pub type UploadStream = BoxStream<'static, Result<UploadedFile, DocumentError>>;

/// Per-slot outcome of a multi-file upload.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    /// Field name -> stored filename.
    pub uploaded_files: BTreeMap<String, String>,
    /// Field name -> rejection reason.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rejected_files: BTreeMap<String, String>,
}

pub struct Download {
    pub source: ByteSource,
    pub filename: String,
    pub content_type: &'static str,
}

#[async_trait::async_trait]
pub trait DocumentService: Send + Sync {
    async fn get(&self) -> Result<DocumentRegistry, DocumentError>;

    /// Returns `true` if an empty registry was inserted.
    async fn initialize_if_absent(&self) -> Result<bool, DocumentError>;

    async fn store_files(&self, files: UploadStream) -> Result<UploadReport, DocumentError>;

    async fn resolve_download(&self, slot_key: &str) -> Result<Download, DocumentError>;
}
