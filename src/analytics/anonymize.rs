//! Pattern-based removal of personal identifiers from clinical text.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Placeholder for doctors addressed by title.
pub const PROFESSIONAL_PLACEHOLDER: &str = "[PROFESIONAL]";
/// Placeholder for personal names.
pub const NAME_PLACEHOLDER: &str = "[NOMBRE]";
/// Placeholder for hospitals and clinics.
pub const MEDICAL_CENTER_PLACEHOLDER: &str = "[CENTRO_MEDICO]";
/// Placeholder for calendar dates.
pub const DATE_PLACEHOLDER: &str = "[FECHA]";

const MEDICAL_CENTER_KEYWORDS: [&str; 2] = ["Hospital", "Clínica"];

/// How identifiers are located.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymizationStrategy {
    /// Fixed regular-expression rules, no external dependency.
    #[default]
    Regex,
    /// Named-entity spans from the annotation provider.
    Entities,
}

static PROFESSIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bDra?\.?\s+\p{Lu}\p{Ll}+").expect("professional pattern is valid")
});

// A center phrase is consumed whole so its words never pair up as a name.
static NAME_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?:Hospital|Clínica)(?:\s+(?:(?:de la|del|de)\s+)?\p{Lu}\p{Ll}+)+|(\p{Lu}\p{Ll}+)\s+(\p{Lu}\p{Ll}+))\b",
    )
    .expect("name pattern is valid")
});

static MEDICAL_CENTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Hospital|Clínica)(?:\s+(?:(?:de la|del|de)\s+)?\p{Lu}\p{Ll}+)+")
        .expect("medical center pattern is valid")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b|\b\d{4}-\d{2}-\d{2}\b").expect("date pattern is valid")
});

/// Replace professionals, names, medical centers and dates, in that order.
///
/// Best effort: capitalized words that are not names (sentence-initial pairs, drug brands) are
/// replaced too, and lower-case names survive.
pub fn anonymize(text: &str) -> String {
    let text = PROFESSIONAL.replace_all(text, PROFESSIONAL_PLACEHOLDER);
    let text = NAME_PAIR.replace_all(&text, |captures: &Captures<'_>| {
        let (Some(first), Some(second)) = (captures.get(1), captures.get(2)) else {
            return captures[0].to_string();
        };
        if is_medical_center_keyword(first.as_str()) || is_medical_center_keyword(second.as_str())
        {
            captures[0].to_string()
        } else {
            NAME_PLACEHOLDER.to_string()
        }
    });
    let text = MEDICAL_CENTER.replace_all(&text, MEDICAL_CENTER_PLACEHOLDER);
    DATE.replace_all(&text, DATE_PLACEHOLDER).into_owned()
}

fn is_medical_center_keyword(word: &str) -> bool {
    MEDICAL_CENTER_KEYWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_all_four_identifier_kinds() {
        let input = "El paciente Juan Pérez fue atendido el 12/04/2025 por la Dra. García en el Hospital Central.";
        let output = anonymize(input);
        assert_eq!(
            output,
            "El paciente [NOMBRE] fue atendido el [FECHA] por la [PROFESIONAL] en el [CENTRO_MEDICO]."
        );
        for identifier in ["Juan", "Pérez", "12/04/2025", "García", "Central"] {
            assert!(!output.contains(identifier), "{identifier} leaked");
        }
    }

    #[test]
    fn titles_without_dot_and_iso_dates() {
        assert_eq!(
            anonymize("Control con Dr Ramos el 2025-01-15."),
            "Control con [PROFESIONAL] el [FECHA]."
        );
    }

    #[test]
    fn medical_center_connectives_are_covered() {
        assert_eq!(
            anonymize("Ingresó en la Clínica de la Luz y luego en el Hospital del Mar."),
            "Ingresó en la [CENTRO_MEDICO] y luego en el [CENTRO_MEDICO]."
        );
    }

    #[test]
    fn center_keyword_after_capitalized_word_is_not_a_name() {
        assert_eq!(
            anonymize("ayer visitó El Hospital Central."),
            "ayer visitó El [CENTRO_MEDICO]."
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        let input = "sin datos personales, dosis 2.5 mg";
        assert_eq!(anonymize(input), input);
    }
}
