//! Field extraction on top of a language-model backend.

use async_trait::async_trait;
use tracing::{debug, info};

use super::backend::{CompletionRequest, LlmBackend};
use super::prompt::build_prompt;
use super::rules;
use crate::error::ExtractionError;
use crate::models::{FieldValues, LlmConfig};

/// Maps document text onto the 11-field schema.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Every returned field is non-blank.
    async fn extract(&self, text: &str) -> Result<FieldValues, ExtractionError>;
}

/// [`FieldExtractor`] that prompts an [`LlmBackend`] once per document.
pub struct LlmFieldExtractor<B: LlmBackend> {
    backend: B,
    model: String,
    temperature: f32,
    max_input_chars: usize,
}

impl<B: LlmBackend> LlmFieldExtractor<B> {
    pub fn new(backend: B, config: &LlmConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
            max_input_chars: config.max_input_chars,
        }
    }
}

#[async_trait]
impl<B: LlmBackend> FieldExtractor for LlmFieldExtractor<B> {
    async fn extract(&self, text: &str) -> Result<FieldValues, ExtractionError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_prompt(text, self.max_input_chars),
            temperature: self.temperature,
        };
        info!("Requesting field extraction from {}", self.model);

        let reply = self.backend.complete(&request).await?;
        debug!("Model reply: {} chars", reply.chars().count());

        let parsed = rules::parse_reply(&reply)?;
        let mut fields = rules::complete_fields(&parsed);
        rules::normalize(&mut fields);
        Ok(fields)
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Backend returning a canned reply and recording every request.
    #[derive(Clone)]
    pub struct CannedBackend {
        pub reply: Result<String, String>,
        pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl CannedBackend {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                requests: Arc::default(),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                requests: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, ExtractionError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().map_err(ExtractionError::Request)
        }
    }
}
