//! Output contract of the annotation provider.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while calling the annotation provider.
#[derive(Debug, Error)]
pub enum AnnotationClientError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid annotation service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider responded with an unexpected status code.
    #[error("Unexpected annotation service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the provider.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// One token with its linguistic tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    /// Surface form.
    pub word: String,
    /// Dictionary form.
    #[serde(default)]
    pub lemma: String,
    /// Part-of-speech tag (Universal Dependencies or Penn style).
    #[serde(default)]
    pub pos: String,
    /// Named-entity label; `O` or absent outside entities.
    #[serde(default)]
    pub ner: Option<String>,
}

impl AnnotatedToken {
    /// Entity label, if the token belongs to one.
    pub fn entity_label(&self) -> Option<&str> {
        self.ner
            .as_deref()
            .filter(|label| !label.is_empty() && *label != "O")
    }
}

/// A named-entity mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Mention text.
    pub text: String,
    /// Entity label, e.g. `PERSON`.
    pub label: String,
}

/// Sentiment of one sentence on a 0 (very negative) to 4 (very positive) scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSentiment {
    /// Sentence text.
    pub text: String,
    /// Sentiment class.
    pub score: u8,
}

/// Subject–relation–object triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTriple {
    /// Subject phrase.
    pub subject: String,
    /// Relation phrase.
    pub relation: String,
    /// Object phrase.
    pub object: String,
    /// Extractor confidence when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Full provider output for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Tokens in document order.
    #[serde(default)]
    pub tokens: Vec<AnnotatedToken>,
    /// Entity mentions in document order.
    #[serde(default)]
    pub entities: Vec<EntityMention>,
    /// Per-sentence sentiment.
    #[serde(default)]
    pub sentences: Vec<SentenceSentiment>,
    /// Extracted relation triples.
    #[serde(default)]
    pub triples: Vec<RelationTriple>,
}
