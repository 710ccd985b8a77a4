//! Frequency-based keyword ranking and extractive summaries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tokenize::{TokenizerConfig, split_sentences, tokenize};

/// A ranked keyword and the number of times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordScore {
    /// Normalized token.
    pub term: String,
    /// Occurrences in the source token stream.
    pub frequency: usize,
}

/// Token counts that remember the order in which each token first appeared.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    counts: HashMap<String, usize>,
    order: Vec<String>,
}

impl FrequencyTable {
    /// Count every token of a stream.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::default();
        for token in tokens {
            let token = token.as_ref();
            match table.counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    table.counts.insert(token.to_string(), 1);
                    table.order.push(token.to_string());
                }
            }
        }
        table
    }

    /// Occurrences of `token`; zero when it never appeared.
    pub fn frequency(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no token was counted.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Top `limit` tokens by descending frequency; ties keep first-seen order.
    pub fn top(&self, limit: usize) -> Vec<KeywordScore> {
        let mut ranked: Vec<KeywordScore> = self
            .order
            .iter()
            .map(|term| KeywordScore {
                term: term.clone(),
                frequency: self.frequency(term),
            })
            .collect();
        // Stable sort keeps first-seen order among equal frequencies.
        ranked.sort_by(|left, right| right.frequency.cmp(&left.frequency));
        ranked.truncate(limit);
        ranked
    }
}

/// Rank an already-normalized token stream.
pub fn rank_keywords<S: AsRef<str>>(tokens: &[S], limit: usize) -> Vec<KeywordScore> {
    FrequencyTable::from_tokens(tokens.iter().map(AsRef::as_ref)).top(limit)
}

/// Tokenize `text` and return its `limit` most frequent qualifying tokens.
pub fn extract_keywords(text: &str, config: &TokenizerConfig, limit: usize) -> Vec<KeywordScore> {
    rank_keywords(&tokenize(text, config), limit)
}

/// Sentence ordering applied by [`summarize_by_score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryOrder {
    /// Selected sentences are returned in the order they appear in the document.
    #[default]
    Document,
    /// Selected sentences are returned highest score first.
    Score,
}

/// Sentence selected by the score-ranked summarizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    /// Zero-based position of the sentence in the document.
    pub position: usize,
    /// Sentence text as split from the document.
    pub text: String,
    /// Sum of the document-wide frequencies of the sentence's tokens.
    pub score: usize,
}

/// Return the first `n` sentences of `text`.
pub fn summarize_first_n(text: &str, n: usize) -> Vec<String> {
    split_sentences(text).into_iter().take(n).collect()
}

/// Score each sentence by the global frequency of its tokens and keep the best `n`.
///
/// Frequencies come from the same table used for keyword ranking, built over the whole text.
/// Equal scores favour the earlier sentence.
pub fn summarize_by_score(
    text: &str,
    config: &TokenizerConfig,
    n: usize,
    order: SummaryOrder,
) -> Vec<ScoredSentence> {
    let table = FrequencyTable::from_tokens(tokenize(text, config));

    let mut scored: Vec<ScoredSentence> = split_sentences(text)
        .into_iter()
        .enumerate()
        .map(|(position, sentence)| {
            let score = tokenize(&sentence, config)
                .iter()
                .map(|token| table.frequency(token))
                .sum();
            ScoredSentence {
                position,
                text: sentence,
                score,
            }
        })
        .collect();

    scored.sort_by(|left, right| right.score.cmp(&left.score));
    scored.truncate(n);
    if order == SummaryOrder::Document {
        scored.sort_by_key(|sentence| sentence.position);
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "El paciente presenta síntomas respiratorios como disnea, tos seca y fatiga crónica. \
        Durante el examen clínico, se detectaron ruidos respiratorios anormales. \
        Se recomienda realizar pruebas espirométricas y continuar con tratamiento broncodilatador. \
        No se observaron signos de infección activa.";

    #[test]
    fn most_frequent_terms_come_first() {
        let keywords = extract_keywords(REPORT, &TokenizerConfig::default(), 10);
        assert_eq!(keywords[0].term, "respiratorios");
        assert_eq!(keywords[0].frequency, 2);
        assert_eq!(keywords[1].term, "paciente");
        assert_eq!(keywords[2].term, "presenta");
        assert!(keywords.iter().all(|keyword| keyword.term != "como"));
        assert_eq!(keywords.len(), 10);
    }

    #[test]
    fn short_tokens_and_stop_words_never_rank() {
        let keywords = extract_keywords(
            "la tos de la tos para para dolor dolor",
            &TokenizerConfig::default(),
            10,
        );
        assert_eq!(
            keywords,
            vec![KeywordScore {
                term: "dolor".into(),
                frequency: 2
            }]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ranked = rank_keywords(&["beta", "alfa", "beta", "alfa", "gamma"], 2);
        assert_eq!(ranked[0].term, "beta");
        assert_eq!(ranked[1].term, "alfa");
    }

    #[test]
    fn first_n_truncates() {
        let summary = summarize_first_n("Uno. Dos. Tres. Cuatro.", 3);
        assert_eq!(summary, vec!["Uno.", "Dos.", "Tres."]);
    }

    #[test]
    fn score_ranked_summary_restores_document_order() {
        let text = "Paciente estable. Fiebre alta con fiebre nocturna. Control mensual. \
            Fiebre persistente y fiebre recurrente.";
        let config = TokenizerConfig::default();

        let by_document = summarize_by_score(text, &config, 2, SummaryOrder::Document);
        let positions: Vec<usize> = by_document.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3]);

        let by_score = summarize_by_score(text, &config, 2, SummaryOrder::Score);
        assert!(by_score[0].score >= by_score[1].score);
    }
}
