//! Routes a document to direct extraction or OCR by its format.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{JudexError, Result};
use crate::models::{DocumentFormat, InputDocument, OcrConfig, RawText};
use crate::ocr::{OcrFallback, PdftoppmRasterizer, TesseractEngine};
use crate::text::{
    DOCX_NO_CONTENT, DirectText, DocxReader, LopdfTextReader, PdfTextReader, PlainTextReader,
    TXT_NO_CONTENT,
};

/// Turns any supported document into [`RawText`].
///
/// | format        | path                                              |
/// |---------------|---------------------------------------------------|
/// | docx, txt     | direct read; empty → "no content" placeholder     |
/// | pdf           | direct read; empty or unreadable → OCR fallback   |
/// | jpg/png/bmp   | OCR                                               |
pub struct Dispatcher {
    docx: DocxReader,
    plain: PlainTextReader,
    pdf: Box<dyn PdfTextReader>,
    ocr: OcrFallback,
}

impl Dispatcher {
    /// Create a dispatcher with the built-in readers and the given OCR path.
    pub fn new(ocr: OcrFallback) -> Self {
        Self {
            docx: DocxReader::new(),
            plain: PlainTextReader::new(),
            pdf: Box::new(LopdfTextReader::new()),
            ocr,
        }
    }

    /// Create a dispatcher backed by the Tesseract and pdftoppm executables.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(OcrFallback::new(
            Box::new(TesseractEngine::new(&config.tesseract_cmd)),
            Box::new(PdftoppmRasterizer::new(&config.pdftoppm_cmd)),
        ))
    }

    /// Replace the PDF text-layer reader.
    pub fn with_pdf_reader(mut self, reader: Box<dyn PdfTextReader>) -> Self {
        self.pdf = reader;
        self
    }

    /// Derive text from `doc`, whose content is also present on disk at `path`.
    ///
    /// The on-disk copy is only touched when OCR is needed.
    pub fn dispatch(&self, doc: &InputDocument, path: &Path) -> Result<RawText> {
        let format = doc.format()?;
        debug!("Dispatching {} as {}", doc.name, format);

        match format {
            DocumentFormat::Docx => {
                let text = self.docx.read(&doc.bytes)?;
                Ok(RawText::direct(text.or_placeholder(DOCX_NO_CONTENT), format))
            }
            DocumentFormat::Txt => {
                let text = self.plain.read(&doc.bytes)?;
                Ok(RawText::direct(text.or_placeholder(TXT_NO_CONTENT), format))
            }
            DocumentFormat::Pdf => self.dispatch_pdf(doc, path),
            DocumentFormat::Image(kind) => {
                info!("{} is an image, running OCR", doc.name);
                Ok(self.ocr.recognize_image(path, kind)?)
            }
        }
    }

    /// Read a file in place, without a temporary copy.
    pub fn dispatch_file(&self, path: &Path) -> Result<RawText> {
        let doc = InputDocument::from_path(path).map_err(JudexError::Io)?;
        self.dispatch(&doc, path)
    }

    fn dispatch_pdf(&self, doc: &InputDocument, path: &Path) -> Result<RawText> {
        match self.pdf.read(&doc.bytes) {
            Ok(DirectText::Content(text)) => Ok(RawText::direct(text, DocumentFormat::Pdf)),
            Ok(DirectText::Empty) => {
                warn!("{} has no text layer, treating as scanned PDF", doc.name);
                Ok(self.ocr.recognize_scanned_pdf(path)?)
            }
            Err(e) => {
                warn!("{} could not be read directly ({}), treating as scanned PDF", doc.name, e);
                Ok(self.ocr.recognize_scanned_pdf(path)?)
            }
        }
    }
}
