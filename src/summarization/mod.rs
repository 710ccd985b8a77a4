//! Abstractive summaries through an LLM provider.
//!
//! Summarization is optional. With no provider configured the processing layer only offers the
//! extractive strategies from [`crate::analytics::keywords`]. Both clients talk HTTP directly
//! with `reqwest`: Ollama through `/api/generate`, OpenAI through `/v1/chat/completions`.

use std::sync::Arc;

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Instruction prepended to every document sent to a provider.
pub const SUMMARY_PROMPT: &str = "Resume el siguiente texto médico con un lenguaje claro y estructurado para su análisis: ";

const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const SUMMARY_TEMPERATURE: f64 = 0.4;

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was explicitly disabled or unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by abstractive summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize one document.
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError>;

    /// Model identifier reported alongside generated summaries.
    fn model(&self) -> &str;
}

/// Build the summarization client selected by configuration, if any.
pub fn build_summarization_client(config: &Config) -> Option<Arc<dyn SummarizationClient>> {
    match config.summarization_provider {
        SummarizationProvider::None => None,
        SummarizationProvider::Ollama => {
            let model = config
                .summarization_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
            Some(Arc::new(OllamaSummarizationClient::new(
                config.ollama_url.clone(),
                model,
            )))
        }
        SummarizationProvider::OpenAI => {
            let Some(api_key) = config.openai_api_key.clone() else {
                tracing::warn!("SUMMARIZATION_PROVIDER=openai but OPENAI_API_KEY is unset");
                return None;
            };
            let model = config
                .summarization_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            Some(Arc::new(OpenAiSummarizationClient::new(
                config.openai_base_url.clone(),
                api_key,
                model,
            )))
        }
    }
}

fn http_client() -> Client {
    Client::builder()
        .user_agent("docanalytics/summary")
        .build()
        .unwrap_or_else(|_| Client::new())
}

struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    fn new(base_url: String, model: String) -> Self {
        Self {
            http: http_client(),
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": format!("{SUMMARY_PROMPT}{text}"),
            "stream": false,
            "options": {
                "temperature": SUMMARY_TEMPERATURE,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }

    fn model(&self) -> &str {
        &self.model
    }
}

struct OpenAiSummarizationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizationClient {
    fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: http_client(),
            base_url,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl SummarizationClient for OpenAiSummarizationClient {
    async fn summarize(&self, text: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": format!("{SUMMARY_PROMPT}{text}") }
            ],
            "temperature": SUMMARY_TEMPERATURE,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach OpenAI at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "OpenAI returned {status}: {body}"
            )));
        }

        let completion: ChatCompletion = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode chat completion: {error}"
            ))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse("completion has no choices".into())
            })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
