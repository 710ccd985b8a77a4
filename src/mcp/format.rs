//! Formatting helpers shared across MCP handlers and resources.

use std::collections::BTreeMap;

use crate::processing::{ProcessingError, ServiceCapabilities};
use rmcp::model::ResourceContents;
use schemars::JsonSchema;
use serde::Serialize;

pub(crate) const APPLICATION_JSON: &str = "application/json";

/// Health snapshot returned by the `health` resource.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct HealthSnapshot {
    /// Search index reachability.
    pub(crate) search_index: SearchIndexHealth,
    /// Annotation provider wired.
    pub(crate) annotation: bool,
    /// Summarization model, when a provider is configured.
    pub(crate) summarization_model: Option<String>,
}

/// Search index section of [`HealthSnapshot`].
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SearchIndexHealth {
    /// Configured base URL.
    pub(crate) url: String,
    /// Whether listing collections succeeded.
    pub(crate) reachable: bool,
    /// Number of visible collections when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) collections: Option<usize>,
    /// Failure reason when unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

/// Build the health payload from capabilities and a collection listing attempt.
pub(crate) fn health_payload(
    url: &str,
    capabilities: &ServiceCapabilities,
    collections: Result<BTreeMap<String, u64>, ProcessingError>,
) -> HealthSnapshot {
    let search_index = match collections {
        Ok(collections) => SearchIndexHealth {
            url: url.to_string(),
            reachable: true,
            collections: Some(collections.len()),
            error: None,
        },
        Err(error) => SearchIndexHealth {
            url: url.to_string(),
            reachable: false,
            collections: None,
            error: Some(error.to_string()),
        },
    };

    HealthSnapshot {
        search_index,
        annotation: capabilities.annotation,
        summarization_model: capabilities.summarization_model.clone(),
    }
}

/// Analytics defaults returned by the `settings` resource.
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct SettingsSnapshot {
    /// Tokens with this many characters or fewer are discarded.
    pub(crate) token_length_threshold: usize,
    /// Keywords per document.
    pub(crate) keyword_limit: usize,
    /// Extractive summary length.
    pub(crate) summary_sentences: usize,
    /// Clustering defaults.
    pub(crate) clustering: ClusteringSettingsSnapshot,
}

/// Clustering section of [`SettingsSnapshot`].
#[derive(Debug, Serialize, JsonSchema)]
pub(crate) struct ClusteringSettingsSnapshot {
    /// Default k.
    pub(crate) k: usize,
    /// Iteration cap.
    pub(crate) max_iterations: usize,
    /// Default seed.
    pub(crate) seed: u64,
}

impl From<&ServiceCapabilities> for SettingsSnapshot {
    fn from(capabilities: &ServiceCapabilities) -> Self {
        Self {
            token_length_threshold: capabilities.token_length_threshold,
            keyword_limit: capabilities.keyword_limit,
            summary_sentences: capabilities.summary_sentences,
            clustering: ClusteringSettingsSnapshot {
                k: capabilities.cluster_count,
                max_iterations: capabilities.cluster_max_iterations,
                seed: capabilities.cluster_seed,
            },
        }
    }
}

/// Serialize a value to JSON, falling back to compact formatting on error.
pub(crate) fn serialize_json<T: Serialize>(value: &T, context_uri: &str) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|error| {
        tracing::warn!(uri = context_uri, %error, "Failed to serialize JSON prettily");
        serde_json::to_string(value).unwrap_or_else(|_| "{}".into())
    })
}

/// Build JSON resource contents for MCP resource responses.
pub(crate) fn json_resource_contents(uri: &str, text: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri: uri.to_string(),
        mime_type: Some(APPLICATION_JSON.into()),
        text,
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn capabilities() -> ServiceCapabilities {
        ServiceCapabilities {
            search_index: true,
            annotation: false,
            summarization_model: Some("llama3.1".into()),
            token_length_threshold: 3,
            keyword_limit: 10,
            summary_sentences: 3,
            cluster_count: 2,
            cluster_max_iterations: 100,
            cluster_seed: 42,
        }
    }

    #[test]
    fn health_payload_captures_index_failure() {
        let snapshot = health_payload(
            "http://localhost:9200",
            &capabilities(),
            Err(ProcessingError::Unavailable("search index")),
        );
        let value: Value =
            serde_json::from_str(&serialize_json(&snapshot, "mcp://health")).expect("valid JSON");

        assert_eq!(value["search_index"]["reachable"], false);
        assert_eq!(value["search_index"]["error"], "search index is not configured");
        assert!(value["search_index"].get("collections").is_none());
        assert_eq!(value["summarization_model"], "llama3.1");
    }

    #[test]
    fn health_payload_counts_collections() {
        let collections = BTreeMap::from([("notas".to_string(), 4), ("pacientes".to_string(), 9)]);
        let snapshot = health_payload("http://os:9200", &capabilities(), Ok(collections));
        assert!(snapshot.search_index.reachable);
        assert_eq!(snapshot.search_index.collections, Some(2));
    }

    #[test]
    fn settings_snapshot_groups_clustering_defaults() {
        let snapshot = SettingsSnapshot::from(&capabilities());
        let value = serde_json::to_value(&snapshot).expect("json");
        assert_eq!(value["clustering"]["seed"], 42);
        assert_eq!(value["keyword_limit"], 10);
    }
}
