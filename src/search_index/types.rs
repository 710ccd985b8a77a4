//! Shared types used by the OpenSearch client.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with OpenSearch.
#[derive(Debug, Error)]
pub enum SearchIndexError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid OpenSearch URL: {0}")]
    InvalidUrl(String),
    /// Collection name is not usable as an index name.
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// OpenSearch responded with an unexpected status code.
    #[error("Unexpected OpenSearch response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from OpenSearch.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// How OpenSearch applied a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexStatus {
    /// A new document was stored.
    Created,
    /// An existing document with the same id was replaced.
    Updated,
    /// The write changed nothing.
    Noop,
    /// Any other result string.
    Other,
}

impl IndexStatus {
    /// Interpret the `result` field of an index response.
    pub fn from_result(result: &str) -> Self {
        match result.to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "updated" => Self::Updated,
            "noop" => Self::Noop,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Noop => "NOOP",
            Self::Other => "OTHER",
        };
        f.write_str(label)
    }
}

/// Result of indexing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexOutcome {
    /// Identifier under which the document is stored.
    pub id: String,
    /// Write status reported by OpenSearch.
    pub status: IndexStatus,
}

#[derive(Deserialize)]
pub(crate) struct IndexResponse {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    pub(crate) result: String,
}

#[derive(Deserialize)]
pub(crate) struct CatIndexRow {
    pub(crate) index: String,
    #[serde(rename = "docs.count", default)]
    pub(crate) docs_count: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AcknowledgedResponse {
    #[serde(default)]
    pub(crate) acknowledged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_and_displays_uppercase() {
        assert_eq!(IndexStatus::from_result("created"), IndexStatus::Created);
        assert_eq!(IndexStatus::from_result("UPDATED"), IndexStatus::Updated);
        assert_eq!(IndexStatus::from_result("deleted"), IndexStatus::Other);
        assert_eq!(IndexStatus::Created.to_string(), "CREATED");
        assert_eq!(
            serde_json::to_value(IndexStatus::Noop).expect("json"),
            serde_json::json!("NOOP")
        );
    }
}
