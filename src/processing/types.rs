//! Request, response and error types for the analytics service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    AnalyticsError, AnonymizationStrategy, DatasetSummary, Document, DocumentClustering,
    KeywordScore, Segments, SummaryOrder, Table, TrendPrediction,
};
use crate::annotation::{AnnotationClientError, RelationTriple, SentimentReport};
use crate::search_index::SearchIndexError;
use crate::storage::StorageError;
use crate::summarization::SummarizationClientError;

/// Errors emitted by the analytics service.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The input was unusable for the requested analytic.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    /// A stored file could not be read or decoded.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The search index rejected a request.
    #[error("Search index request failed: {0}")]
    SearchIndex(#[from] SearchIndexError),
    /// The annotation provider failed.
    #[error("Annotation request failed: {0}")]
    Annotation(#[from] AnnotationClientError),
    /// The summarization provider failed.
    #[error("Summarization failed: {0}")]
    Summarization(#[from] SummarizationClientError),
    /// The request did not name its input correctly.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// A collaborator needed by the operation is not configured.
    #[error("{0} is not configured")]
    Unavailable(&'static str),
    /// A result could not be turned into an index record.
    #[error("Failed to serialize result record: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where an operation reads its documents from. Exactly one source must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentInput {
    /// Name of a stored file.
    #[serde(default)]
    pub file: Option<String>,
    /// Inline documents.
    #[serde(default)]
    pub documents: Option<Vec<Document>>,
    /// Inline raw text.
    #[serde(default)]
    pub text: Option<String>,
}

impl DocumentInput {
    /// Input naming a stored file.
    pub fn from_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Input carrying inline documents.
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..Self::default()
        }
    }

    /// Input carrying raw text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Where a tabular operation reads its dataset from. Exactly one source must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableInput {
    /// Name of a stored CSV or JSON file.
    #[serde(default)]
    pub file: Option<String>,
    /// Inline table.
    #[serde(default)]
    pub table: Option<Table>,
}

/// Keyword extraction parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordsRequest {
    /// Documents to analyze.
    #[serde(flatten)]
    pub input: DocumentInput,
    /// Keywords per document; defaults to the configured limit.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Rank lemmas of nouns, verbs and adjectives from the annotation provider.
    #[serde(default)]
    pub lemmatize: bool,
    /// Collection that receives one record per document.
    #[serde(default)]
    pub index: Option<String>,
}

/// Summary flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStrategy {
    /// First sentences of the document.
    FirstN,
    /// Sentences with the highest token-frequency score.
    #[default]
    ByScore,
    /// Generated by the configured LLM provider.
    Abstractive,
}

/// Summarization parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummarizeRequest {
    /// Documents to summarize.
    #[serde(flatten)]
    pub input: DocumentInput,
    /// Summary flavour.
    #[serde(default)]
    pub strategy: SummaryStrategy,
    /// Sentences kept by extractive strategies; defaults to the configured count.
    #[serde(default)]
    pub sentences: Option<usize>,
    /// Ordering of score-ranked sentences.
    #[serde(default)]
    pub order: SummaryOrder,
    /// Collection that receives one record per document.
    #[serde(default)]
    pub index: Option<String>,
}

/// Descriptive statistics parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsRequest {
    /// Dataset to describe.
    #[serde(flatten)]
    pub input: TableInput,
    /// Collection that receives one record per numeric column.
    #[serde(default)]
    pub index: Option<String>,
}

/// Trend prediction parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendRequest {
    /// Dataset holding the series.
    #[serde(flatten)]
    pub input: TableInput,
    /// Column to extrapolate; the first numeric column when omitted.
    #[serde(default)]
    pub column: Option<String>,
    /// Collection that receives the prediction record.
    #[serde(default)]
    pub index: Option<String>,
}

/// Clustering parameters; unset fields fall back to configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusteringRequest {
    /// Documents to cluster. Plain-text files contribute one document per line.
    #[serde(flatten)]
    pub input: DocumentInput,
    /// Number of clusters.
    #[serde(default)]
    pub k: Option<usize>,
    /// Iteration cap.
    #[serde(default)]
    pub max_iterations: Option<usize>,
    /// Seed for centroid initialisation.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Collection that receives one record per document assignment.
    #[serde(default)]
    pub index: Option<String>,
}

/// Parameters shared by operations that only need documents and an optional index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsRequest {
    /// Documents to analyze.
    #[serde(flatten)]
    pub input: DocumentInput,
    /// Collection that receives one record per document.
    #[serde(default)]
    pub index: Option<String>,
}

/// Anonymization parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnonymizeRequest {
    /// Documents to anonymize.
    #[serde(flatten)]
    pub input: DocumentInput,
    /// Identifier detection strategy.
    #[serde(default)]
    pub strategy: AnonymizationStrategy,
    /// Collection that receives one record per document.
    #[serde(default)]
    pub index: Option<String>,
}

/// Direct write of one document into a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDocumentRequest {
    /// Target collection.
    pub index: String,
    /// Document id; generated by the index when omitted.
    #[serde(default)]
    pub id: Option<String>,
    /// Document body.
    pub document: serde_json::Value,
}

/// Bulk load of a stored JSON or CSV file into a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
    /// Stored file name.
    pub file: String,
    /// Target collection.
    pub index: String,
}

/// Response envelope shared by analytic operations.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse<T> {
    /// Operation output.
    pub results: T,
    /// Number of input documents or rows analyzed.
    pub documents_analyzed: usize,
    /// Number of records written to the search index.
    pub documents_indexed: usize,
}

/// Keywords of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentKeywords {
    /// Source document id.
    pub id: String,
    /// Ranked keywords.
    pub keywords: Vec<KeywordScore>,
}

/// Summary of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    /// Source document id.
    pub id: String,
    /// Strategy that produced the summary.
    pub strategy: SummaryStrategy,
    /// Summary text.
    pub summary: String,
    /// Selected sentences for extractive strategies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sentences: Vec<String>,
    /// Provider model for abstractive summaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Clinical segments of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSegments {
    /// Source document id.
    pub id: String,
    /// Category to sentence map.
    pub segments: Segments,
}

/// Anonymized text of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizedDocument {
    /// Source document id.
    pub id: String,
    /// Strategy used.
    pub strategy: AnonymizationStrategy,
    /// Text with identifiers replaced by placeholders.
    pub anonymized_text: String,
}

/// Sentiment report of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSentiment {
    /// Source document id.
    pub id: String,
    /// Aggregated sentence sentiment.
    #[serde(flatten)]
    pub report: SentimentReport,
}

/// Named entities of one document grouped by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntities {
    /// Source document id.
    pub id: String,
    /// Label to distinct mention texts.
    pub entities: BTreeMap<String, Vec<String>>,
}

/// Relation triples of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTriples {
    /// Source document id.
    pub id: String,
    /// Extracted triples.
    pub triples: Vec<RelationTriple>,
}

/// Result aliases for each analytic.
pub type KeywordsResponse = AnalyticsResponse<Vec<DocumentKeywords>>;
/// Summaries per document.
pub type SummarizeResponse = AnalyticsResponse<Vec<DocumentSummary>>;
/// Dataset statistics.
pub type StatisticsResponse = AnalyticsResponse<DatasetSummary>;
/// Trend prediction.
pub type TrendResponse = AnalyticsResponse<TrendPrediction>;
/// Document clustering.
pub type ClusteringResponse = AnalyticsResponse<DocumentClustering>;
/// Segments per document.
pub type SegmentationResponse = AnalyticsResponse<Vec<DocumentSegments>>;
/// Anonymized documents.
pub type AnonymizeResponse = AnalyticsResponse<Vec<AnonymizedDocument>>;
/// Sentiment per document.
pub type SentimentResponse = AnalyticsResponse<Vec<DocumentSentiment>>;
/// Entities per document.
pub type EntitiesResponse = AnalyticsResponse<Vec<DocumentEntities>>;
/// Triples per document.
pub type TriplesResponse = AnalyticsResponse<Vec<DocumentTriples>>;

/// Outcome of [`IngestRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Stored file that was loaded.
    pub file: String,
    /// Target collection.
    pub index: String,
    /// Number of documents written.
    pub documents_indexed: usize,
}

/// Which collaborators are wired and the analytics defaults in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCapabilities {
    /// Search index client available.
    pub search_index: bool,
    /// Annotation provider available.
    pub annotation: bool,
    /// Model of the summarization provider, when one is configured.
    pub summarization_model: Option<String>,
    /// Token length threshold.
    pub token_length_threshold: usize,
    /// Default keyword limit.
    pub keyword_limit: usize,
    /// Default extractive summary length.
    pub summary_sentences: usize,
    /// Default k.
    pub cluster_count: usize,
    /// K-means iteration cap.
    pub cluster_max_iterations: usize,
    /// Default k-means seed.
    pub cluster_seed: u64,
}
