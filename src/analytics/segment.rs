//! Keyword-driven clinical sentence segmentation.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::tokenize::split_sentences;

/// Clinical section a sentence can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentCategory {
    /// Reported symptoms.
    Symptoms,
    /// Clinical history.
    History,
    /// Recommendations to the patient.
    Recommendations,
    /// Prescribed or administered treatment.
    Treatment,
}

impl SegmentCategory {
    /// Categories in matching priority order.
    pub const ALL: [SegmentCategory; 4] = [
        SegmentCategory::Symptoms,
        SegmentCategory::History,
        SegmentCategory::Recommendations,
        SegmentCategory::Treatment,
    ];

    /// Lower-case cues that put a sentence into this category.
    pub fn cues(self) -> &'static [&'static str] {
        match self {
            SegmentCategory::Symptoms => &["síntoma", "refiere", "dolor", "fiebre"],
            SegmentCategory::History => &["antecedente", "historia clínica"],
            SegmentCategory::Recommendations => &["recomienda", "sugiere", "aconseja"],
            SegmentCategory::Treatment => &["prescribe", "administra", "tratamiento"],
        }
    }

    /// Label used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentCategory::Symptoms => "symptoms",
            SegmentCategory::History => "history",
            SegmentCategory::Recommendations => "recommendations",
            SegmentCategory::Treatment => "treatment",
        }
    }

    /// First category whose cues occur in `sentence`.
    pub fn classify(sentence: &str) -> Option<SegmentCategory> {
        let lowered = sentence.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.cues().iter().any(|cue| lowered.contains(cue)))
    }
}

impl fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category → sentence map for one document. A later matching sentence replaces an earlier one.
pub type Segments = BTreeMap<SegmentCategory, String>;

/// Assign each sentence of `text` to at most one category, keeping the last match per category.
pub fn segment(text: &str) -> Segments {
    let mut segments = Segments::new();
    for sentence in split_sentences(text) {
        if let Some(category) = SegmentCategory::classify(&sentence) {
            segments.insert(category, sentence);
        }
    }
    segments
}
