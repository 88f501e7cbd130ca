//! PDF text-layer extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::debug;

use super::DirectText;
use crate::error::ReadError;

/// Reads the embedded text layer of a PDF.
pub trait PdfTextReader: Send + Sync {
    /// Extract page texts joined with newlines, skipping pages without text.
    ///
    /// A scanned PDF yields [`DirectText::Empty`].
    fn read(&self, data: &[u8]) -> Result<DirectText, ReadError>;
}

/// [`PdfTextReader`] backed by lopdf for loading and pdf-extract for text.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextReader;

impl LopdfTextReader {
    pub fn new() -> Self {
        Self
    }

    /// Load the document, decrypting PDFs protected by an empty password.
    ///
    /// Returns the bytes pdf-extract should read and the page count.
    fn prepare(&self, data: &[u8]) -> Result<(Vec<u8>, usize), ReadError> {
        let mut doc = Document::load_mem(data).map_err(|e| ReadError::Pdf(e.to_string()))?;

        let raw = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(ReadError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| ReadError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        Ok((raw, doc.get_pages().len()))
    }
}

impl PdfTextReader for LopdfTextReader {
    fn read(&self, data: &[u8]) -> Result<DirectText, ReadError> {
        let (raw, page_count) = self.prepare(data)?;
        if page_count == 0 {
            return Ok(DirectText::Empty);
        }

        // pdf-extract panics on some malformed font programs.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&raw)
        }))
        .map_err(|_| ReadError::Pdf("text extraction panicked".to_string()))?
        .map_err(|e| ReadError::Pdf(e.to_string()))?;

        let text = join_pages(&pages);
        debug!(
            "PDF text layer: {} pages, {} chars",
            page_count,
            text.chars().count()
        );

        Ok(DirectText::from_text(&text))
    }
}

/// Join trimmed page texts with newlines, dropping pages that are blank.
fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = ["  第一页 \n", "\n\n", "第三页"];
        assert_eq!(join_pages(&pages), "第一页\n第三页");
    }

    #[test]
    fn test_join_pages_all_blank() {
        let pages = ["", "  "];
        assert_eq!(DirectText::from_text(&join_pages(&pages)), DirectText::Empty);
    }

    #[test]
    fn test_invalid_pdf() {
        let err = LopdfTextReader::new().read(b"not a pdf").unwrap_err();
        assert!(matches!(err, ReadError::Pdf(_)));
    }
}
