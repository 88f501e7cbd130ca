//! Tesseract command-line engine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace, warn};

use super::{OcrEngine, RecognitionSettings};
use crate::error::OcrError;

/// Runs `tesseract <image> stdout` for every image.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
}

impl TesseractEngine {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Whether the executable can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command).arg("--version").output().is_ok()
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &Path, settings: &RecognitionSettings) -> Result<String, OcrError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(settings.languages)
            .arg("--psm")
            .arg(settings.page_seg_mode.to_string())
            .arg("--oem")
            .arg(settings.engine_mode.to_string());
        trace!("Running {:?}", cmd);

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => OcrError::EngineUnavailable {
                command: self.command.display().to_string(),
                reason: e.to_string(),
            },
            _ => OcrError::Io(e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(OcrError::Recognition(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("tesseract recognized {} chars", text.chars().count());
        Ok(text)
    }
}
