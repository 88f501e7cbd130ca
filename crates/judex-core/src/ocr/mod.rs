//! OCR fallback for scanned PDFs and standalone images.
//!
//! Recognition itself is delegated to an [`OcrEngine`]; scanned PDFs are first
//! rendered page by page through a [`PageRasterizer`]. The production
//! implementations drive the Tesseract and Poppler command-line tools.

mod raster;
mod tesseract;

pub use raster::PdftoppmRasterizer;
pub use tesseract::TesseractEngine;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::{DocumentFormat, ImageKind, RawText};

/// Resolution scanned PDF pages are rendered at.
pub const RENDER_DPI: u32 = 300;

/// Text handed on when recognition finds nothing.
pub const OCR_NO_TEXT: &str = "OCR识别失败：图片无有效文本内容";

/// Fixed recognition settings passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// Tesseract `-l` value.
    pub languages: &'static str,
    /// Page segmentation mode.
    pub page_seg_mode: u8,
    /// Engine mode.
    pub engine_mode: u8,
}

impl RecognitionSettings {
    /// Simplified Chinese plus English for case numbers and digits, a single
    /// uniform block of text, and whichever engine is available.
    pub const LEGAL_DOCUMENT: RecognitionSettings = RecognitionSettings {
        languages: "chi_sim+eng",
        page_seg_mode: 6,
        engine_mode: 3,
    };
}

/// Recognizes the text in one image file.
pub trait OcrEngine: Send + Sync {
    /// Return the raw recognized text. An image without text yields an empty
    /// string, not an error.
    fn recognize(&self, image: &Path, settings: &RecognitionSettings) -> Result<String, OcrError>;
}

/// Renders the pages of a PDF into image files.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf` into `out_dir` and return the image paths in
    /// page order.
    fn rasterize(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError>;
}

/// Combines an engine and a rasterizer into the fallback path.
pub struct OcrFallback {
    engine: Box<dyn OcrEngine>,
    rasterizer: Box<dyn PageRasterizer>,
    settings: RecognitionSettings,
}

impl OcrFallback {
    pub fn new(engine: Box<dyn OcrEngine>, rasterizer: Box<dyn PageRasterizer>) -> Self {
        Self {
            engine,
            rasterizer,
            settings: RecognitionSettings::LEGAL_DOCUMENT,
        }
    }

    /// Recognize a standalone image.
    pub fn recognize_image(&self, path: &Path, kind: ImageKind) -> Result<RawText, OcrError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        info!("Running OCR on {}x{} image", width, height);

        let text = self.recognize_or_placeholder(path)?;
        Ok(RawText::ocr(text, DocumentFormat::Image(kind), None))
    }

    /// Render a scanned PDF at [`RENDER_DPI`] and recognize it page by page.
    ///
    /// Each page is wrapped in numbered start/end markers. Page images are
    /// removed as soon as they are recognized.
    pub fn recognize_scanned_pdf(&self, path: &Path) -> Result<RawText, OcrError> {
        let work_dir = tempfile::tempdir()?;
        let pages = self.rasterizer.rasterize(path, RENDER_DPI, work_dir.path())?;
        if pages.is_empty() {
            return Err(OcrError::Rasterize("no pages were rendered".to_string()));
        }
        info!("Rendered {} pages at {} DPI", pages.len(), RENDER_DPI);

        let mut text = String::new();
        for (index, page) in pages.iter().enumerate() {
            let number = index + 1;
            let page_text = self.recognize_or_placeholder(page);
            // Drop the page image before propagating any failure.
            let _ = std::fs::remove_file(page);
            let page_text = page_text?;

            debug!("Page {}: {} chars", number, page_text.chars().count());
            text.push_str(&format!("【扫描件PDF-第{}页开始】", number));
            text.push_str(&page_text);
            text.push_str(&format!("【扫描件PDF-第{}页结束】\n", number));
        }

        Ok(RawText::ocr(text, DocumentFormat::Pdf, Some(pages.len() as u32)))
    }

    fn recognize_or_placeholder(&self, image: &Path) -> Result<String, OcrError> {
        let text = self.engine.recognize(image, &self.settings)?;
        let text = text.trim();
        if text.is_empty() {
            Ok(OCR_NO_TEXT.to_string())
        } else {
            Ok(text.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scriptable engine and rasterizer doubles.

    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns queued results in order; records every call.
    #[derive(Clone, Default)]
    pub struct ScriptedEngine {
        pub results: Arc<Mutex<Vec<Result<String, String>>>>,
        pub calls: Arc<AtomicUsize>,
        pub seen: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ScriptedEngine {
        pub fn returning(results: Vec<Result<&str, &str>>) -> Self {
            let results = results
                .into_iter()
                .rev()
                .map(|r| r.map(str::to_string).map_err(str::to_string))
                .collect();
            Self {
                results: Arc::new(Mutex::new(results)),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn recognize(&self, image: &Path, settings: &RecognitionSettings) -> Result<String, OcrError> {
            assert_eq!(*settings, RecognitionSettings::LEGAL_DOCUMENT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(image.to_path_buf());
            self.results
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(String::new()))
                .map_err(OcrError::Recognition)
        }
    }

    /// Writes `pages` placeholder files named like pdftoppm output.
    pub struct FakeRasterizer {
        pub pages: usize,
    }

    impl PageRasterizer for FakeRasterizer {
        fn rasterize(&self, _pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
            assert_eq!(dpi, RENDER_DPI);
            (1..=self.pages)
                .map(|n| {
                    let path = out_dir.join(format!("page-{}.png", n));
                    std::fs::write(&path, b"png")?;
                    Ok(path)
                })
                .collect()
        }
    }

    pub fn write_png(path: &Path) {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([255, 255, 255]));
        img.save(path).unwrap();
    }
}
