//! Normal-range sentences.
//!
//! The report template prints a table of normal ranges (`<0,5` and the like)
//! next to each risk score. The wording around each score depends on whether
//! the patient's value is below that threshold, so the threshold is read
//! from the template itself rather than duplicated in configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use repgen_core::models::score::{SCORE_DECIMALS, ScoreSet};

/// A table as rows of cell texts.
pub type TableText = Vec<Vec<String>>;

/// Links one row of the normal-range table to a score and the placeholder
/// that receives the sentence word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub row: usize,
    pub score_key: String,
    pub sentence_key: String,
}

impl ThresholdRule {
    pub fn new(row: usize, score_key: &str, sentence_key: &str) -> Self {
        Self {
            row,
            score_key: score_key.to_string(),
            sentence_key: sentence_key.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSettings {
    /// A table qualifies when one of its header cells equals one of these.
    pub header_markers: Vec<String>,
    /// Zero-based column holding the threshold text.
    pub column: usize,
    pub rules: Vec<ThresholdRule>,
    /// Word used when the score is below the threshold.
    pub below_word: String,
    /// Word used otherwise, including when the threshold is unreadable.
    pub above_word: String,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            header_markers: vec!["Normalbereich".to_string(), "Normal range".to_string()],
            column: 3,
            rules: vec![
                ThresholdRule::new(1, "CKD_score", "ckd_sentence"),
                ThresholdRule::new(2, "CAD_score", "cad_sentence"),
                ThresholdRule::new(3, "HF_score", "hf_sentence"),
                ThresholdRule::new(4, "Onkorisk_score", "onco_sentence"),
            ],
            below_word: "keine".to_string(),
            above_word: "eine".to_string(),
        }
    }
}

/// Parse a threshold cell such as `<0,5` or `< 1.25`.
pub fn parse_threshold(text: &str) -> Option<f64> {
    text.replace('<', "").trim().replace(',', ".").parse().ok()
}

/// First table whose header row contains one of the markers.
pub fn find_threshold_table<'a>(
    tables: &'a [TableText],
    settings: &ThresholdSettings,
) -> Option<&'a TableText> {
    tables.iter().find(|table| {
        table.first().is_some_and(|header| {
            header
                .iter()
                .any(|cell| settings.header_markers.iter().any(|m| cell.trim() == m))
        })
    })
}

/// Choose the sentence word for every rule. A missing score counts as 0.
pub fn evaluate(
    table: &TableText,
    settings: &ThresholdSettings,
    scores: &ScoreSet,
) -> BTreeMap<String, String> {
    let mut sentences = BTreeMap::new();

    for rule in &settings.rules {
        let cell = table.get(rule.row).and_then(|row| row.get(settings.column));
        if cell.is_none() {
            warn!(
                row = rule.row,
                column = settings.column,
                "threshold cell missing from table"
            );
        }
        let threshold = cell.and_then(|text| parse_threshold(text));

        // Compare the value as it appears in the document.
        let value = round_to(scores.get(&rule.score_key).unwrap_or(0.0), SCORE_DECIMALS);

        let word = match threshold {
            Some(t) if value < t => &settings.below_word,
            _ => &settings.above_word,
        };
        sentences.insert(rule.sentence_key.clone(), word.clone());
    }

    sentences
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
