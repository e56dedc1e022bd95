use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// One of the four named file categories held by the registry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DocumentSlot {
    #[serde(rename = "resumePDF")]
    ResumePdf,
    #[serde(rename = "resumeDOCX")]
    ResumeDocx,
    #[serde(rename = "coverLetterPDF")]
    CoverLetterPdf,
    #[serde(rename = "coverLetterDOCX")]
    CoverLetterDocx,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 4] = [
        DocumentSlot::ResumePdf,
        DocumentSlot::ResumeDocx,
        DocumentSlot::CoverLetterPdf,
        DocumentSlot::CoverLetterDocx,
    ];

    /// Field name used in the registry record and in upload forms.
    pub fn field_name(&self) -> &'static str {
        match self {
            DocumentSlot::ResumePdf => "resumePDF",
            DocumentSlot::ResumeDocx => "resumeDOCX",
            DocumentSlot::CoverLetterPdf => "coverLetterPDF",
            DocumentSlot::CoverLetterDocx => "coverLetterDOCX",
        }
    }

    /// Key used by the public download route.
    pub fn public_key(&self) -> &'static str {
        match self {
            DocumentSlot::ResumePdf => "resume-pdf",
            DocumentSlot::ResumeDocx => "resume-docx",
            DocumentSlot::CoverLetterPdf => "cover-letter-pdf",
            DocumentSlot::CoverLetterDocx => "cover-letter-docx",
        }
    }

    pub fn from_public_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.public_key() == key)
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.field_name() == name)
    }

    /// Storage category (sub-directory) for files of this slot.
    pub fn category(&self) -> &'static str {
        match self {
            DocumentSlot::ResumePdf | DocumentSlot::ResumeDocx => "resumes",
            DocumentSlot::CoverLetterPdf | DocumentSlot::CoverLetterDocx => "cover-letters",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentSlot::ResumePdf | DocumentSlot::CoverLetterPdf => PDF_MIME,
            DocumentSlot::ResumeDocx | DocumentSlot::CoverLetterDocx => DOCX_MIME,
        }
    }

    pub fn accepts(&self, content_type: Option<&str>) -> bool {
        let Some(content_type) = content_type else {
            return false;
        };
        // Ignore parameters such as "; charset=binary".
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case(self.mime_type())
    }
}

impl fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// Opaque reference to stored file bytes.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(pub String);

impl Locator {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentFile {
    pub filename: String,
    pub locator: Locator,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl DocumentFile {
    pub fn is_empty(&self) -> bool {
        self.locator.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRegistry {
    #[serde(rename = "resumePDF")]
    pub resume_pdf: DocumentFile,
    #[serde(rename = "resumeDOCX")]
    pub resume_docx: DocumentFile,
    #[serde(rename = "coverLetterPDF")]
    pub cover_letter_pdf: DocumentFile,
    #[serde(rename = "coverLetterDOCX")]
    pub cover_letter_docx: DocumentFile,
}

impl DocumentRegistry {
    pub fn slot(&self, slot: DocumentSlot) -> &DocumentFile {
        match slot {
            DocumentSlot::ResumePdf => &self.resume_pdf,
            DocumentSlot::ResumeDocx => &self.resume_docx,
            DocumentSlot::CoverLetterPdf => &self.cover_letter_pdf,
            DocumentSlot::CoverLetterDocx => &self.cover_letter_docx,
        }
    }

    pub fn slot_mut(&mut self, slot: DocumentSlot) -> &mut DocumentFile {
        match slot {
            DocumentSlot::ResumePdf => &mut self.resume_pdf,
            DocumentSlot::ResumeDocx => &mut self.resume_docx,
            DocumentSlot::CoverLetterPdf => &mut self.cover_letter_pdf,
            DocumentSlot::CoverLetterDocx => &mut self.cover_letter_docx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_keys_map_to_slots() {
        assert_eq!(
            DocumentSlot::from_public_key("cover-letter-docx"),
            Some(DocumentSlot::CoverLetterDocx)
        );
        assert_eq!(DocumentSlot::from_public_key("resume"), None);
    }

    #[test]
    fn slot_accepts_only_its_mime_family() {
        assert!(DocumentSlot::ResumePdf.accepts(Some("application/pdf")));
        assert!(DocumentSlot::ResumePdf.accepts(Some("Application/PDF; charset=binary")));
        assert!(!DocumentSlot::ResumePdf.accepts(Some(DOCX_MIME)));
        assert!(!DocumentSlot::ResumeDocx.accepts(None));
    }

    #[test]
    fn empty_registry_serializes_all_slots() {
        let json = serde_json::to_value(DocumentRegistry::default()).unwrap();
        for slot in DocumentSlot::ALL {
            assert_eq!(json[slot.field_name()]["filename"], "");
            assert!(json[slot.field_name()]["uploadedAt"].is_null());
        }
    }
}
