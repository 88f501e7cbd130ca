//! Error types for the judex-core library.

use thiserror::Error;

/// Main error type for the judex library.
#[derive(Error, Debug)]
pub enum JudexError {
    /// The file extension is not one of the supported input formats.
    #[error("unsupported file format: {0:?}")]
    UnsupportedFormat(String),

    /// Direct text extraction error.
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Structured field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the direct text readers.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The DOCX archive or its XML could not be parsed.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// The PDF could not be parsed or its text layer could not be read.
    #[error("failed to read PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Neither the primary nor the fallback encoding could decode the text.
    #[error("text is neither valid UTF-8 nor GBK")]
    Encoding,

    /// I/O error while acquiring the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR or rasterization binary could not be started.
    #[error("engine unavailable ({command}): {reason}")]
    EngineUnavailable { command: String, reason: String },

    /// Rendering PDF pages to images failed.
    #[error("failed to rasterize PDF: {0}")]
    Rasterize(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The image could not be decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// I/O error around intermediate files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to language-model field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The backend response carried no message content.
    #[error("response has no message content")]
    MissingContent,

    /// The model reply is not a JSON object.
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Request(err.to_string())
    }
}

/// Errors related to writing the result table.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error writing the output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the judex library.
pub type Result<T> = std::result::Result<T, JudexError>;
