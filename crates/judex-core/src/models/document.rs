//! Input documents and the normalized text derived from them.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JudexError;

/// Raster image kinds accepted for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
}

/// Input format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Word-processor document.
    Docx,
    /// PDF, either with a text layer or scanned.
    Pdf,
    /// Plain text.
    Txt,
    /// Standalone image.
    Image(ImageKind),
}

/// Extensions accepted as input, lower-case and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["docx", "pdf", "txt", "jpg", "jpeg", "png", "bmp"];

impl DocumentFormat {
    /// Classify a file name by its extension, case-insensitively.
    pub fn from_filename(name: &str) -> Result<Self, JudexError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Self::from_extension(&extension)
    }

    /// Classify a bare extension (without the dot).
    pub fn from_extension(extension: &str) -> Result<Self, JudexError> {
        match extension.to_lowercase().as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            "txt" => Ok(DocumentFormat::Txt),
            "jpg" | "jpeg" => Ok(DocumentFormat::Image(ImageKind::Jpeg)),
            "png" => Ok(DocumentFormat::Image(ImageKind::Png)),
            "bmp" => Ok(DocumentFormat::Image(ImageKind::Bmp)),
            other => Err(JudexError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Whether the format always goes through OCR.
    pub fn is_image(&self) -> bool {
        matches!(self, DocumentFormat::Image(_))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Txt => write!(f, "txt"),
            DocumentFormat::Image(ImageKind::Jpeg) => write!(f, "jpeg"),
            DocumentFormat::Image(ImageKind::Png) => write!(f, "png"),
            DocumentFormat::Image(ImageKind::Bmp) => write!(f, "bmp"),
        }
    }
}

/// A file submitted for processing.
///
/// Lives only until its text has been derived.
#[derive(Debug, Clone)]
pub struct InputDocument {
    /// Original file name, used for provenance.
    pub name: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl InputDocument {
    /// Create a document from a name and its content.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk, keeping only the file name for provenance.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Infer the format tag from the file name.
    pub fn format(&self) -> Result<DocumentFormat, JudexError> {
        DocumentFormat::from_filename(&self.name)
    }

    /// Lower-case extension including the leading dot, or empty.
    pub fn suffix(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default()
    }
}

/// Plain text derived from a document, with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    /// The normalized text.
    pub text: String,
    /// Format of the document the text came from.
    pub source: DocumentFormat,
    /// Whether OCR produced the text.
    pub ocr_used: bool,
    /// Number of OCR'd pages when the text carries page markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl RawText {
    /// Text obtained from a document's own text layer.
    pub fn direct(text: impl Into<String>, source: DocumentFormat) -> Self {
        Self {
            text: text.into(),
            source,
            ocr_used: false,
            page_count: None,
        }
    }

    /// Text obtained through OCR.
    pub fn ocr(text: impl Into<String>, source: DocumentFormat, page_count: Option<u32>) -> Self {
        Self {
            text: text.into(),
            source,
            ocr_used: true,
            page_count,
        }
    }
}
