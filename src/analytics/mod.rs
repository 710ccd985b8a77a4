//! Stateless document analytics: tokenization, term-frequency vectors, descriptive statistics,
//! linear trends, keyword ranking, extractive summaries, k-means clustering, clinical
//! segmentation, and regex anonymization.
//!
//! Every function in this module is a pure transform over an in-memory batch. Nothing is cached
//! between calls apart from the read-only [`AnalyticsSettings`] constructed once at start-up and
//! passed in by reference.

pub mod anonymize;
pub mod cluster;
pub mod keywords;
pub mod segment;
pub mod stats;
pub mod tokenize;
pub mod trend;
pub mod types;
pub mod vectorize;

pub use anonymize::{AnonymizationStrategy, anonymize};
pub use cluster::{
    ClusterSummary, Clustering, DocumentClustering, KMeansOptions, cluster, cluster_documents,
};
pub use keywords::{
    FrequencyTable, KeywordScore, ScoredSentence, SummaryOrder, extract_keywords, rank_keywords,
    summarize_by_score, summarize_first_n,
};
pub use segment::{SegmentCategory, Segments, segment};
pub use stats::{DatasetSummary, describe};
pub use tokenize::{TokenizerConfig, split_sentences, tokenize};
pub use trend::{predict, predict_from_table};
pub use types::{
    AnalyticsError, AnalyticsSettings, ClusterAssignment, Document, NumericColumnStats, Table,
    TrendPrediction,
};
pub use vectorize::{TermVector, Vocabulary, vectorize};
