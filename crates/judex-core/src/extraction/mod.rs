//! Structured field extraction through a language model.

mod backend;
mod client;
mod prompt;
pub mod rules;

pub use backend::{CompletionRequest, LlmBackend, OpenAiCompatibleBackend};
pub use client::{FieldExtractor, LlmFieldExtractor};
pub use prompt::build_prompt;
