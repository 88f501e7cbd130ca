//! Drives every document through dispatch and extraction.

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::extraction::FieldExtractor;
use crate::models::{
    BatchConfig, ExtractedRecord, FieldValues, InputDocument, ResultCollection, TIMESTAMP_FORMAT,
};

/// Lifecycle of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
}

/// Outcome counts of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Progress hooks. `index` is zero-based.
pub trait BatchObserver: Send + Sync {
    fn on_file_started(&self, _index: usize, _total: usize, _name: &str) {}

    fn on_file_finished(&self, _index: usize, _total: usize, _record: &ExtractedRecord) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

enum Source {
    Document(InputDocument),
    Path(PathBuf),
}

impl Source {
    fn name(&self) -> String {
        match self {
            Source::Document(doc) => doc.name.clone(),
            Source::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }

    fn load(self) -> Result<InputDocument> {
        match self {
            Source::Document(doc) => Ok(doc),
            Source::Path(path) => Ok(InputDocument::from_path(&path)?),
        }
    }
}

/// Processes documents one at a time in submission order.
///
/// Each document yields exactly one record: a failure anywhere in its
/// pipeline becomes a failure record and the batch moves on.
pub struct BatchOrchestrator {
    dispatcher: Dispatcher,
    extractor: Box<dyn FieldExtractor>,
    observer: Box<dyn BatchObserver>,
    config: BatchConfig,
    results: ResultCollection,
    state: BatchState,
}

impl BatchOrchestrator {
    pub fn new(dispatcher: Dispatcher, extractor: Box<dyn FieldExtractor>, config: BatchConfig) -> Self {
        Self {
            dispatcher,
            extractor,
            observer: Box::new(NoopObserver),
            config,
            results: ResultCollection::new(),
            state: BatchState::Idle,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn BatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Records of the most recent run.
    pub fn results(&self) -> &ResultCollection {
        &self.results
    }

    pub fn into_results(self) -> ResultCollection {
        self.results
    }

    /// Process in-memory documents.
    pub async fn run(&mut self, documents: Vec<InputDocument>) -> BatchSummary {
        self.run_sources(documents.into_iter().map(Source::Document).collect())
            .await
    }

    /// Process files on disk, reading each one only when its turn comes.
    pub async fn run_paths(&mut self, paths: &[PathBuf]) -> BatchSummary {
        self.run_sources(paths.iter().cloned().map(Source::Path).collect())
            .await
    }

    async fn run_sources(&mut self, sources: Vec<Source>) -> BatchSummary {
        self.results.clear();
        self.state = BatchState::Running;

        let total = sources.len();
        info!("Starting batch of {} files", total);

        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (index, source) in sources.into_iter().enumerate() {
            let name = source.name();
            info!("[{}/{}] Processing {}", index + 1, total, name);
            self.observer.on_file_started(index, total, &name);

            let outcome = match source.load() {
                Ok(doc) => self.process(&doc).await,
                Err(e) => Err(e),
            };
            let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();

            let record = match outcome {
                Ok(fields) => {
                    summary.succeeded += 1;
                    info!("[{}/{}] {} extracted", index + 1, total, name);
                    ExtractedRecord::success(name, timestamp, fields)
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("[{}/{}] {} failed: {}", index + 1, total, name, e);
                    ExtractedRecord::failure(
                        name,
                        timestamp,
                        &e.to_string(),
                        self.config.failure_cause_max_chars,
                    )
                }
            };

            self.observer.on_file_finished(index, total, &record);
            self.results.push(record);
        }

        self.state = BatchState::Completed;
        info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );
        summary
    }

    async fn process(&self, doc: &InputDocument) -> Result<FieldValues> {
        doc.format()?;

        // Removed when this function returns.
        let mut materialized = tempfile::Builder::new()
            .prefix("judex-")
            .suffix(&doc.suffix())
            .tempfile()?;
        materialized.write_all(&doc.bytes)?;
        materialized.flush()?;

        let raw = self.dispatcher.dispatch(doc, materialized.path())?;
        if raw.ocr_used {
            info!("{}: OCR produced {} chars", doc.name, raw.text.chars().count());
        }

        Ok(self.extractor.extract(&raw.text).await?)
    }
}
