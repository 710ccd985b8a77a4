//! Deep NLP annotations from an external provider and the reports derived from them.
//!
//! The provider tokenizes, lemmatizes, tags parts of speech and named entities, scores sentence
//! sentiment and extracts relation triples. This crate only consumes its output contract; the
//! derived reports in [`reports`] are pure functions over that output.

pub mod client;
pub mod reports;
pub mod types;

use async_trait::async_trait;

pub use client::HttpAnnotationClient;
pub use reports::{
    SentimentReport, anonymize_with_entities, group_entities, lemma_keywords, sentiment_report,
};
pub use types::{
    AnnotatedToken, Annotation, AnnotationClientError, EntityMention, RelationTriple,
    SentenceSentiment,
};

/// Source of linguistic annotations.
#[async_trait]
pub trait AnnotationProvider: Send + Sync {
    /// Annotate one document.
    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationClientError>;
}
