//! Direct text extraction for documents that carry their own text layer.

mod docx;
mod pdf;
mod plain;

pub use docx::DocxReader;
pub use pdf::{LopdfTextReader, PdfTextReader};
pub use plain::PlainTextReader;

/// Outcome of a direct read that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectText {
    /// Non-empty text.
    Content(String),
    /// The document parsed but holds no text.
    Empty,
}

impl DirectText {
    /// Wrap trimmed text, mapping blank input to [`DirectText::Empty`].
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            DirectText::Empty
        } else {
            DirectText::Content(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DirectText::Empty)
    }

    /// The content, or `placeholder` when empty.
    pub fn or_placeholder(self, placeholder: &str) -> String {
        match self {
            DirectText::Content(text) => text,
            DirectText::Empty => placeholder.to_string(),
        }
    }
}

/// Text handed on for a DOCX file without paragraphs.
pub const DOCX_NO_CONTENT: &str = "DOCX文件无有效文本内容";

/// Text handed on for an empty plain-text file.
pub const TXT_NO_CONTENT: &str = "TXT文件无有效文本内容";
