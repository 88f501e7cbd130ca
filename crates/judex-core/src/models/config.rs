//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the judex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JudexConfig {
    /// Language-model backend configuration.
    pub llm: LlmConfig,

    /// OCR collaborator configuration.
    pub ocr: OcrConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Export configuration.
    pub export: ExportConfig,
}

/// Language-model backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature. Kept near zero for reproducible extraction.
    pub temperature: f32,

    /// Maximum number of characters of document text sent per request.
    pub max_input_chars: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.1,
            max_input_chars: 3000,
            timeout_secs: 120,
        }
    }
}

/// Locations of the external OCR binaries.
///
/// Recognition settings (languages, layout mode, DPI) are fixed and live in
/// [`crate::ocr`]; only the executables are configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Poppler `pdftoppm` executable used to rasterize scanned PDFs.
    pub pdftoppm_cmd: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum characters of the failure cause kept in a failure record.
    pub failure_cause_max_chars: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            failure_cause_max_chars: 50,
        }
    }
}

/// Output table format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values with a UTF-8 BOM.
    #[default]
    Csv,
    /// JSON array of records.
    Json,
}

impl ExportFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory. `None` lets the front end choose.
    pub output_dir: Option<PathBuf>,

    /// File name prefix; a generation timestamp is appended.
    pub file_prefix: String,

    /// Output format.
    pub format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: "裁判文书提取结果".to_string(),
            format: ExportFormat::Csv,
        }
    }
}

impl JudexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: JudexConfig =
            serde_json::from_str(r#"{"llm": {"model": "deepseek-reasoner"}}"#).unwrap();

        assert_eq!(config.llm.model, "deepseek-reasoner");
        assert_eq!(config.llm.max_input_chars, 3000);
        assert_eq!(config.batch.failure_cause_max_chars, 50);
        assert_eq!(config.export.format, ExportFormat::Csv);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = JudexConfig::default();
        config.export.format = ExportFormat::Json;
        config.save(&path).unwrap();

        let loaded = JudexConfig::from_file(&path).unwrap();
        assert_eq!(loaded.export.format, ExportFormat::Json);
        assert_eq!(loaded.llm.base_url, "https://api.deepseek.com/v1");
    }
}
