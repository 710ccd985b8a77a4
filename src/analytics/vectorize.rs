//! Batch-scoped vocabulary and raw term-frequency vectors.

use std::collections::HashMap;

use serde::Serialize;

use super::tokenize::{TokenizerConfig, tokenize};
use super::types::{AnalyticsError, Document};

/// Distinct normalized tokens of one batch, in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from token streams, preserving the order in which terms first appear.
    pub fn from_token_streams<S: AsRef<[String]>>(streams: &[S]) -> Self {
        let mut vocabulary = Self::default();
        for stream in streams {
            for token in stream.as_ref() {
                vocabulary.insert(token);
            }
        }
        vocabulary
    }

    fn insert(&mut self, token: &str) {
        if !self.positions.contains_key(token) {
            self.positions.insert(token.to_string(), self.terms.len());
            self.terms.push(token.to_string());
        }
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary holds no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in vector order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Vector position of `term`, if it belongs to the vocabulary.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.positions.get(term).copied()
    }

    /// Project a token stream onto this vocabulary; tokens outside it are ignored.
    pub fn term_vector(&self, tokens: &[String]) -> TermVector {
        let mut counts = vec![0.0; self.terms.len()];
        for token in tokens {
            if let Some(position) = self.position(token) {
                counts[position] += 1.0;
            }
        }
        TermVector(counts)
    }
}

/// Raw term counts aligned to a [`Vocabulary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TermVector(Vec<f64>);

impl TermVector {
    /// Wrap precomputed counts.
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Vector components.
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all components, i.e. the number of vocabulary tokens in the document.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Tokenize a batch, build its vocabulary, then count every document against it.
///
/// The vocabulary is complete before the first vector is produced, so all vectors share the
/// same length and term order. Batches with fewer than two documents are rejected because the
/// vectors only exist to feed clustering.
pub fn vectorize(
    batch: &[Document],
    config: &TokenizerConfig,
) -> Result<(Vocabulary, Vec<TermVector>), AnalyticsError> {
    if batch.len() < 2 {
        return Err(AnalyticsError::InvalidInput(format!(
            "vectorization needs at least 2 documents, got {}",
            batch.len()
        )));
    }

    let streams: Vec<Vec<String>> = batch
        .iter()
        .map(|document| tokenize(&document.text, config))
        .collect();
    let vocabulary = Vocabulary::from_token_streams(&streams);

    let vectors: Vec<TermVector> = streams
        .iter()
        .map(|tokens| vocabulary.term_vector(tokens))
        .collect();

    assert!(
        vectors.iter().all(|vector| vector.len() == vocabulary.len()),
        "term vectors must align with the batch vocabulary"
    );
    tracing::debug!(
        documents = batch.len(),
        vocabulary = vocabulary.len(),
        "Vectorized batch"
    );

    Ok((vocabulary, vectors))
}
