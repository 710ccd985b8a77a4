//! Shared data model and error definitions for the analytics core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tokenize::TokenizerConfig;

/// Errors returned by analytic transforms when the caller supplied unusable input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// The batch contained no documents, or the dataset had no header or data rows.
    #[error("input is empty")]
    EmptyInput,
    /// The batch was malformed for the requested operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Too few numeric points were available for the requested computation.
    #[error("insufficient data: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Minimum number of points the operation needs.
        required: usize,
        /// Number of points that were actually available.
        actual: usize,
    },
}

/// A single input document. Identifier uniqueness is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-supplied identifier; an empty id is replaced by a generated one at ingestion.
    #[serde(default)]
    pub id: String,
    /// Raw document text.
    pub text: String,
    /// Optional timestamp carried through to result records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Optional origin label (endpoint, file, feed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Build a document with only an identifier and text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: None,
            source: None,
        }
    }
}

/// Tabular dataset: a header row plus data rows of raw cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Column names in declared order.
    pub headers: Vec<String>,
    /// Data rows; a row may be shorter or longer than the header.
    pub rows: Vec<Vec<String>>,
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericColumnStats {
    /// Column header.
    pub field: String,
    /// Number of cells that parsed as finite numbers.
    pub count: usize,
    /// Arithmetic mean of the parsed values.
    pub mean: f64,
    /// Population standard deviation (denominator = count).
    pub std_dev: f64,
    /// Smallest parsed value.
    pub min: f64,
    /// Largest parsed value.
    pub max: f64,
}

/// One-step linear extrapolation over an ordered series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPrediction {
    /// Name of the series (column header for tabular input).
    pub series: String,
    /// Last observed value.
    pub last_value: f64,
    /// Extrapolated value at `x_next`.
    pub predicted_value: f64,
    /// 1-based position following the last observed point.
    pub x_next: usize,
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Number of points used for the fit.
    pub points: usize,
}

/// Assignment of a document to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    /// Identifier of the source document.
    pub document_id: String,
    /// Cluster label in `[0, k)`.
    pub cluster_id: usize,
}

/// Read-only pipeline configuration built once at process start.
#[derive(Debug, Clone)]
pub struct AnalyticsSettings {
    /// Tokenizer thresholds and stop-words.
    pub tokenizer: TokenizerConfig,
    /// Number of keywords returned per document.
    pub keyword_limit: usize,
    /// Number of sentences kept by extractive summaries.
    pub summary_sentences: usize,
    /// Default number of clusters.
    pub cluster_count: usize,
    /// Iteration cap for k-means.
    pub cluster_max_iterations: usize,
    /// Default seed for k-means seeding.
    pub cluster_seed: u64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            keyword_limit: 10,
            summary_sentences: 3,
            cluster_count: 2,
            cluster_max_iterations: 100,
            cluster_seed: 42,
        }
    }
}
