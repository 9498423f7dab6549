use std::collections::BTreeSet;

use repgen_core::models::template::TemplateKind;
use repgen_core::naming::figure_placeholder;
use repgen_export::docx::Scaffold;

use crate::context::PATIENT_FIELDS;
use crate::settings::ReportSettings;

/// Threshold printed in a fresh normal-range table; meant to be edited.
const PLACEHOLDER_THRESHOLD: &str = "<0,5";

const TABLE_LABELS: &[&str] = &["Score", "Wert", "Einheit"];

/// Starter template content for `kind`: every placeholder the context
/// builder fills, and for the main report a normal-range table laid out
/// the way the threshold rules read it.
pub fn scaffold_for(kind: TemplateKind, settings: &ReportSettings) -> Scaffold {
    let mut fields: Vec<String> = PATIENT_FIELDS.iter().map(|f| f.to_string()).collect();
    let mut table = Vec::new();

    if kind.includes_scores() {
        for source in &settings.score_sources {
            fields.extend(source.keys().map(str::to_string));
        }
        fields.extend(
            settings
                .thresholds
                .rules
                .iter()
                .map(|rule| rule.sentence_key.clone()),
        );
        table = threshold_table(settings);
    }
    let mut seen = BTreeSet::new();
    fields.retain(|f| seen.insert(f.clone()));

    let figures = settings
        .required_figures(kind)
        .iter()
        .map(|&n| figure_placeholder(kind, n))
        .collect();

    Scaffold {
        fields,
        figures,
        table,
    }
}

fn threshold_table(settings: &ReportSettings) -> Vec<Vec<String>> {
    let thresholds = &settings.thresholds;
    let Some(marker) = thresholds.header_markers.first() else {
        return Vec::new();
    };
    let width = thresholds.column + 1;
    let rows = thresholds.rules.iter().map(|r| r.row).max().unwrap_or(0) + 1;

    let mut table = vec![vec![String::new(); width]; rows];
    for (i, label) in TABLE_LABELS.iter().enumerate().take(thresholds.column) {
        table[0][i] = label.to_string();
    }
    table[0][thresholds.column] = marker.clone();

    for rule in &thresholds.rules {
        let row = &mut table[rule.row];
        row[0] = rule.score_key.clone();
        if thresholds.column > 1 {
            row[1] = format!("{{{{ {} }}}}", rule.score_key);
        }
        row[thresholds.column] = PLACEHOLDER_THRESHOLD.to_string();
    }
    table
}
