//! Data model shared across the pipeline.

pub mod config;
pub mod document;
pub mod record;

pub use config::{BatchConfig, ExportConfig, ExportFormat, JudexConfig, LlmConfig, OcrConfig};
pub use document::{DocumentFormat, ImageKind, InputDocument, RawText, SUPPORTED_EXTENSIONS};
pub use record::{
    DocumentType, ExtractedRecord, Field, FieldValues, ResultCollection, EXTRACTION_FAILED,
    FAILURE_CAUSE_PREFIX, FIELD_COUNT, FIELD_SCHEMA, FILENAME_KEY, MULTI_VALUE_DELIMITER,
    NOT_MENTIONED, TIMESTAMP_FORMAT, TIMESTAMP_KEY, truncate_chars,
};
