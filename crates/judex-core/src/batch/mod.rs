//! Sequential batch processing with per-file failure isolation.

mod orchestrator;

pub use orchestrator::{BatchObserver, BatchOrchestrator, BatchState, BatchSummary, NoopObserver};
