use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::analytics::{AnalyticsSettings, TokenizerConfig};

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the document analytics service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the OpenSearch cluster that receives result records.
    pub opensearch_url: String,
    /// Optional basic-auth user for OpenSearch.
    pub opensearch_username: Option<String>,
    /// Optional basic-auth password for OpenSearch.
    pub opensearch_password: Option<String>,
    /// Directory holding previously uploaded files.
    pub upload_dir: String,
    /// Base URL of the annotation service; annotation-backed operations are disabled when unset.
    pub annotation_url: Option<String>,
    /// Backend used for abstractive summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model override for the summarization backend.
    pub summarization_model: Option<String>,
    /// Ollama runtime address.
    pub ollama_url: String,
    /// Bearer token for the OpenAI-compatible endpoint.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint.
    pub openai_base_url: String,
    /// Tokens with this many characters or fewer are discarded.
    pub token_length_threshold: usize,
    /// Keywords returned per document.
    pub keyword_limit: usize,
    /// Sentences kept by extractive summaries.
    pub summary_sentences: usize,
    /// Default number of k-means clusters.
    pub cluster_count: usize,
    /// K-means iteration cap.
    pub cluster_max_iterations: usize,
    /// Default k-means seed.
    pub cluster_seed: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported backends for abstractive summarization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Abstractive summaries are disabled.
    #[default]
    None,
    /// Local Ollama runtime.
    Ollama,
    /// Hosted OpenAI chat completions API.
    OpenAI,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            opensearch_url: optional("OPENSEARCH_URL")
                .unwrap_or_else(|| "http://localhost:9200".to_string()),
            opensearch_username: optional("OPENSEARCH_USERNAME"),
            opensearch_password: optional("OPENSEARCH_PASSWORD"),
            upload_dir: optional("UPLOAD_DIR").unwrap_or_else(|| "uploaded_files".to_string()),
            annotation_url: optional("ANNOTATION_URL"),
            summarization_provider: optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                    })
                })
                .transpose()?
                .unwrap_or_default(),
            summarization_model: optional("SUMMARIZATION_MODEL"),
            ollama_url: optional("OLLAMA_URL")
                .unwrap_or_else(|| "http://127.0.0.1:11434".to_string()),
            openai_api_key: optional("OPENAI_API_KEY"),
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            token_length_threshold: parse_or(
                "TOKEN_LENGTH_THRESHOLD",
                optional("TOKEN_LENGTH_THRESHOLD"),
                3,
            )?,
            keyword_limit: parse_or("KEYWORD_LIMIT", optional("KEYWORD_LIMIT"), 10)?,
            summary_sentences: parse_or("SUMMARY_SENTENCES", optional("SUMMARY_SENTENCES"), 3)?,
            cluster_count: parse_or("CLUSTER_COUNT", optional("CLUSTER_COUNT"), 2)?,
            cluster_max_iterations: parse_or(
                "CLUSTER_MAX_ITERATIONS",
                optional("CLUSTER_MAX_ITERATIONS"),
                100,
            )?,
            cluster_seed: parse_or("CLUSTER_SEED", optional("CLUSTER_SEED"), 42)?,
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }

    /// Read-only analytics parameters derived from this configuration.
    pub fn analytics_settings(&self) -> AnalyticsSettings {
        AnalyticsSettings {
            tokenizer: TokenizerConfig::with_threshold(self.token_length_threshold),
            keyword_limit: self.keyword_limit,
            summary_sentences: self.summary_sentences,
            cluster_count: self.cluster_count,
            cluster_max_iterations: self.cluster_max_iterations,
            cluster_seed: self.cluster_seed,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

impl FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        opensearch_url = %config.opensearch_url,
        upload_dir = %config.upload_dir,
        annotation = config.annotation_url.is_some(),
        summarization_provider = ?config.summarization_provider,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config.opensearch_url, "http://localhost:9200");
        assert_eq!(config.upload_dir, "uploaded_files");
        assert_eq!(config.summarization_provider, SummarizationProvider::None);
        assert!(config.annotation_url.is_none());
        assert_eq!(config.server_port, None);

        let settings = config.analytics_settings();
        assert_eq!(settings.tokenizer.length_threshold(), 3);
        assert_eq!(settings.keyword_limit, 10);
        assert_eq!(settings.cluster_seed, 42);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("SUMMARIZATION_PROVIDER", "OpenAI"),
            ("TOKEN_LENGTH_THRESHOLD", "2"),
            ("CLUSTER_COUNT", "4"),
            ("ANNOTATION_URL", "http://nlp:9000"),
            ("OPENSEARCH_PASSWORD", "  "),
        ]))
        .expect("config");
        assert_eq!(config.summarization_provider, SummarizationProvider::OpenAI);
        assert_eq!(config.analytics_settings().tokenizer.length_threshold(), 2);
        assert_eq!(config.cluster_count, 4);
        assert_eq!(config.annotation_url.as_deref(), Some("http://nlp:9000"));
        assert!(config.opensearch_password.is_none());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let error = Config::from_lookup(lookup(&[("KEYWORD_LIMIT", "diez")])).expect_err("invalid");
        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "KEYWORD_LIMIT"));
        assert!(Config::from_lookup(lookup(&[("SUMMARIZATION_PROVIDER", "bard")])).is_err());
    }
}
