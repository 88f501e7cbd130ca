//! Language-model backend abstraction and the OpenAI-compatible client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::LlmConfig;

/// One single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

/// A chat backend that answers with a JSON object as text.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send `request` once and return the reply content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ExtractionError>;
}

/// Backend for any server exposing `/chat/completions` with bearer auth.
pub struct OpenAiCompatibleBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ExtractionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": request.model,
            "messages": [{ "role": "user", "content": request.prompt }],
            "temperature": request.temperature,
            "response_format": { "type": "json_object" },
        });

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        debug!(
            "POST {} -> {} in {}ms",
            url,
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ExtractionError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|c| c["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or(ExtractionError::MissingContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(server: &MockServer) -> OpenAiCompatibleBackend {
        let config = LlmConfig {
            base_url: format!("{}/v1/", server.uri()),
            ..LlmConfig::default()
        };
        OpenAiCompatibleBackend::new(&config, "sk-test").unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "deepseek-chat".to_string(),
            prompt: "提取字段".to_string(),
            temperature: 0.1,
        }
    }

    #[tokio::test]
    async fn test_complete_sends_structured_output_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{ "role": "user", "content": "提取字段" }],
                "response_format": { "type": "json_object" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"案号\":\"x\"}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = backend(&server).complete(&request()).await.unwrap();
        assert_eq!(reply, "{\"案号\":\"x\"}");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = backend(&server).complete(&request()).await.unwrap_err();
        match err {
            ExtractionError::Backend { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = backend(&server).complete(&request()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::MissingContent));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        let backend = OpenAiCompatibleBackend::new(&config, "sk-test").unwrap();

        let err = backend.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Request(_)));
    }
}
