//! CLI commands.

pub mod config;
pub mod extract;
pub mod text;

use std::path::{Path, PathBuf};

use console::style;
use judex_core::JudexConfig;
use judex_core::models::OcrConfig;
use judex_core::ocr::TesseractEngine;
use tracing::debug;

/// `<config dir>/judex/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("judex")
        .join("config.json")
}

/// The `--config` path when given, the default location otherwise.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<JudexConfig> {
    if let Some(path) = explicit {
        return JudexConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(JudexConfig::from_file(&path)?)
    } else {
        Ok(JudexConfig::default())
    }
}

/// Warn up front when OCR inputs would fail because Tesseract cannot start.
///
/// Returns whether the engine is available.
pub fn check_ocr(config: &OcrConfig) -> bool {
    let available = TesseractEngine::new(&config.tesseract_cmd).is_available();
    if !available {
        eprintln!(
            "{} OCR unavailable: cannot run {}. Scanned PDFs and images will fail.",
            style("⚠").yellow(),
            config.tesseract_cmd.display()
        );
    }
    available
}
