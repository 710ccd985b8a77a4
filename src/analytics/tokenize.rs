//! Sentence and word tokenization for Spanish clinical text.

use std::collections::HashSet;

/// Articles, prepositions, conjunctions and pronouns ignored by every analytic transform.
pub const SPANISH_STOP_WORDS: [&str; 28] = [
    "el", "la", "los", "las", "un", "una", "unos", "unas", "de", "del", "al", "a", "en", "y", "o",
    "que", "con", "por", "para", "se", "su", "sus", "es", "lo", "como", "sin", "pero", "más",
];

/// Default length threshold: tokens with this many characters or fewer are dropped.
pub const DEFAULT_TOKEN_LENGTH_THRESHOLD: usize = 3;

/// Normalization parameters shared by keyword, summary and clustering transforms.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    length_threshold: usize,
    stop_words: HashSet<String>,
}

impl TokenizerConfig {
    /// Build a configuration with the Spanish stop-word set and a custom length threshold.
    pub fn with_threshold(length_threshold: usize) -> Self {
        Self {
            length_threshold,
            stop_words: SPANISH_STOP_WORDS
                .iter()
                .map(|word| (*word).to_string())
                .collect(),
        }
    }

    /// Tokens whose character count is at or below this value are discarded.
    pub fn length_threshold(&self) -> usize {
        self.length_threshold
    }

    /// Whether `token` (already lower-cased) is a stop-word.
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Whether a normalized token survives the length and stop-word filters.
    pub fn accepts(&self, token: &str) -> bool {
        token.chars().count() > self.length_threshold && !self.is_stop_word(token)
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_TOKEN_LENGTH_THRESHOLD)
    }
}

/// Split text into lower-cased word tokens, dropping short tokens and stop-words.
///
/// Boundaries are any character that is neither a letter nor a digit, so accented letters
/// (`á`, `ñ`, `ü`) stay inside their word.
pub fn tokenize(text: &str, config: &TokenizerConfig) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|raw| !raw.is_empty())
        .map(str::to_lowercase)
        .filter(|token| config.accepts(token))
        .collect()
}

/// Split text into trimmed sentences.
///
/// A sentence ends after `.`, `!` or `?` when the next character is whitespace; the terminator
/// stays with its sentence. Empty fragments are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(next_index, next)) = chars.peek() else {
            break;
        };
        if next.is_whitespace() {
            push_sentence(&mut sentences, &text[start..next_index]);
            start = next_index;
        }
    }

    push_sentence(&mut sentences, &text[start..]);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        let config = TokenizerConfig::default();
        let tokens = tokenize("Disnea, TOS seca; fatiga-crónica!", &config);
        assert_eq!(tokens, vec!["disnea", "seca", "fatiga", "crónica"]);
    }

    #[test]
    fn tokenize_respects_threshold_parameter() {
        let strict = TokenizerConfig::default();
        let lenient = TokenizerConfig::with_threshold(2);
        assert!(tokenize("tos", &strict).is_empty());
        assert_eq!(tokenize("tos", &lenient), vec!["tos"]);
    }

    #[test]
    fn tokenize_drops_stop_words() {
        let config = TokenizerConfig::with_threshold(1);
        let tokens = tokenize("el paciente para la consulta", &config);
        assert_eq!(tokens, vec!["paciente", "consulta"]);
    }

    #[test]
    fn split_sentences_requires_trailing_whitespace() {
        let sentences = split_sentences("Dosis 2.5 mg diaria. ¿Fiebre? Sí!  Reposo.");
        assert_eq!(
            sentences,
            vec!["Dosis 2.5 mg diaria.", "¿Fiebre?", "Sí!", "Reposo."]
        );
    }

    #[test]
    fn split_sentences_ignores_blank_input() {
        assert!(split_sentences("   \n ").is_empty());
        assert_eq!(split_sentences("sin punto final"), vec!["sin punto final"]);
    }
}
