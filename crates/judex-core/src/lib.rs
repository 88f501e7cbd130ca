//! Core library for extracting structured fields from court judgments.
//!
//! This crate provides:
//! - Format dispatch for DOCX, PDF, plain text and image inputs
//! - Direct text extraction (DOCX paragraphs, PDF text layer, UTF-8/GBK text)
//! - OCR fallback for scanned PDFs and images via Tesseract
//! - Field extraction through an OpenAI-compatible language model
//! - Sequential batch processing with per-file failure records
//! - CSV and JSON export of the result table

pub mod batch;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod text;

pub use batch::{BatchObserver, BatchOrchestrator, BatchState, BatchSummary};
pub use dispatch::Dispatcher;
pub use error::{ExportError, ExtractionError, JudexError, OcrError, ReadError, Result};
pub use export::Exporter;
pub use extraction::{FieldExtractor, LlmBackend, LlmFieldExtractor, OpenAiCompatibleBackend};
pub use models::{
    DocumentFormat, ExtractedRecord, FieldValues, InputDocument, JudexConfig, RawText,
    ResultCollection,
};
pub use ocr::{OcrEngine, OcrFallback, PageRasterizer};
