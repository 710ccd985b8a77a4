//! Reports computed from provider annotations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analytics::{AnalyticsError, KeywordScore, TokenizerConfig, rank_keywords};
use crate::annotation::types::{AnnotatedToken, EntityMention, SentenceSentiment};

/// Labels of the five sentiment classes, indexed by score.
pub const SENTIMENT_LABELS: [&str; 5] = [
    "Very negative",
    "Negative",
    "Neutral",
    "Positive",
    "Very positive",
];

/// Whether a part-of-speech tag marks a noun, verb or adjective.
fn is_content_pos(pos: &str) -> bool {
    let pos = pos.to_ascii_uppercase();
    matches!(pos.as_str(), "NOUN" | "PROPN" | "VERB" | "ADJ")
        || pos.starts_with("NN")
        || pos.starts_with("VB")
        || pos.starts_with("JJ")
}

/// Rank lemmas of nouns, verbs and adjectives by frequency.
///
/// Lemmas go through the same length and stop-word filters as plain tokens.
pub fn lemma_keywords(
    tokens: &[AnnotatedToken],
    config: &TokenizerConfig,
    limit: usize,
) -> Vec<KeywordScore> {
    let lemmas: Vec<String> = tokens
        .iter()
        .filter(|token| is_content_pos(&token.pos))
        .map(|token| {
            let base = if token.lemma.is_empty() {
                &token.word
            } else {
                &token.lemma
            };
            base.to_lowercase()
        })
        .filter(|lemma| config.accepts(lemma))
        .collect();
    rank_keywords(&lemmas, limit)
}

/// Aggregate sentiment of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    /// Mean sentence score on the 0–4 scale.
    pub average_score: f64,
    /// Number of scored sentences.
    pub sentences_analyzed: usize,
    /// Label of the rounded average score.
    pub summary_sentiment: String,
    /// Sentence count per label.
    pub distribution: BTreeMap<String, usize>,
}

/// Summarize per-sentence sentiment. Scores above 4 are clamped.
pub fn sentiment_report(
    sentences: &[SentenceSentiment],
) -> Result<SentimentReport, AnalyticsError> {
    if sentences.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut distribution = BTreeMap::new();
    let mut total = 0.0;
    for sentence in sentences {
        let score = usize::from(sentence.score).min(SENTIMENT_LABELS.len() - 1);
        total += score as f64;
        *distribution
            .entry(SENTIMENT_LABELS[score].to_string())
            .or_insert(0) += 1;
    }

    let average_score = total / sentences.len() as f64;
    let summary_index = (average_score.round() as usize).min(SENTIMENT_LABELS.len() - 1);

    Ok(SentimentReport {
        average_score,
        sentences_analyzed: sentences.len(),
        summary_sentiment: SENTIMENT_LABELS[summary_index].to_string(),
        distribution,
    })
}

/// Group mention texts by label, dropping repeated mentions.
pub fn group_entities(entities: &[EntityMention]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for mention in entities {
        let texts = grouped.entry(mention.label.clone()).or_default();
        if !texts.contains(&mention.text) {
            texts.push(mention.text.clone());
        }
    }
    grouped
}

fn entity_placeholder(label: &str) -> Option<&'static str> {
    match label {
        "PERSON" => Some("[NOMBRE]"),
        "ORGANIZATION" => Some("[ORGANIZACION]"),
        "LOCATION" => Some("[LUGAR]"),
        "DATE" => Some("[FECHA]"),
        _ => None,
    }
}

/// Rebuild the text from tokens, replacing each entity span with its placeholder.
///
/// Consecutive tokens with the same label form one span. Output tokens are joined by single
/// spaces, so original spacing and punctuation attachment are not preserved.
pub fn anonymize_with_entities(tokens: &[AnnotatedToken]) -> String {
    let mut output: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut open_span: Option<&str> = None;

    for token in tokens {
        match token.entity_label().and_then(|label| entity_placeholder(label).map(|p| (label, p))) {
            Some((label, placeholder)) => {
                if open_span != Some(label) {
                    output.push(placeholder);
                    open_span = Some(label);
                }
            }
            None => {
                output.push(&token.word);
                open_span = None;
            }
        }
    }

    output.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(word: &str, lemma: &str, pos: &str, ner: Option<&str>) -> AnnotatedToken {
        AnnotatedToken {
            word: word.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            ner: ner.map(str::to_string),
        }
    }

    #[test]
    fn lemma_keywords_keep_content_words_only() {
        let tokens = vec![
            token("Pacientes", "paciente", "NOUN", None),
            token("presentaban", "presentar", "VERB", None),
            token("rápidamente", "rápidamente", "ADV", None),
            token("paciente", "paciente", "NOUN", None),
            token("para", "para", "ADP", None),
            token("crónica", "crónico", "ADJ", None),
            token("tos", "tos", "NOUN", None),
        ];
        let keywords = lemma_keywords(&tokens, &TokenizerConfig::default(), 10);
        let terms: Vec<&str> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["paciente", "presentar", "crónico"]);
        assert_eq!(keywords[0].frequency, 2);
    }

    #[test]
    fn sentiment_report_averages_and_labels() {
        let sentences: Vec<SentenceSentiment> = [1u8, 2, 3, 3]
            .iter()
            .map(|score| SentenceSentiment {
                text: "x".into(),
                score: *score,
            })
            .collect();
        let report = sentiment_report(&sentences).expect("report");
        assert_eq!(report.sentences_analyzed, 4);
        assert!((report.average_score - 2.25).abs() < 1e-9);
        assert_eq!(report.summary_sentiment, "Neutral");
        assert_eq!(report.distribution["Positive"], 2);
        assert_eq!(report.distribution["Negative"], 1);
    }

    #[test]
    fn empty_sentiment_input_fails() {
        assert_eq!(sentiment_report(&[]), Err(AnalyticsError::EmptyInput));
    }

    #[test]
    fn entities_group_by_label_without_duplicates() {
        let mention = |text: &str, label: &str| EntityMention {
            text: text.into(),
            label: label.into(),
        };
        let grouped = group_entities(&[
            mention("Juan Pérez", "PERSON"),
            mention("Madrid", "LOCATION"),
            mention("Juan Pérez", "PERSON"),
            mention("Ana", "PERSON"),
        ]);
        assert_eq!(grouped["PERSON"], vec!["Juan Pérez", "Ana"]);
        assert_eq!(grouped["LOCATION"], vec!["Madrid"]);
    }

    #[test]
    fn entity_spans_collapse_into_placeholders() {
        let tokens = vec![
            token("Juan", "", "PROPN", Some("PERSON")),
            token("Pérez", "", "PROPN", Some("PERSON")),
            token("ingresó", "", "VERB", Some("O")),
            token("en", "", "ADP", None),
            token("Madrid", "", "PROPN", Some("LOCATION")),
            token("el", "", "DET", None),
            token("lunes", "", "NOUN", Some("DATE")),
            token("tras", "", "ADP", Some("MISC")),
        ];
        assert_eq!(
            anonymize_with_entities(&tokens),
            "[NOMBRE] ingresó en [LUGAR] el [FECHA] tras"
        );
    }
}
