use repgen_core::models::score::ScoreSet;
use repgen_scores::thresholds::{
    ThresholdSettings, TableText, evaluate, find_threshold_table, parse_threshold,
};

fn normal_range_table() -> TableText {
    let row = |cells: [&str; 4]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    vec![
        row(["Score", "Organ", "Ihr Wert", "Normalbereich"]),
        row(["KidneyRisk", "Niere", "{{ CKD_score }}", "<0,5"]),
        row(["HeartRisk", "Herz", "{{ CAD_score }}", "< 0,3"]),
        row(["Herzinsuffizienz", "Herz", "{{ HF_score }}", "<1.2"]),
        row(["OncoRisk", "Krebs", "{{ Onkorisk_score }}", "siehe Text"]),
    ]
}

#[test]
fn parses_threshold_notations() {
    assert_eq!(parse_threshold("<0,5"), Some(0.5));
    assert_eq!(parse_threshold(" < 1.25 "), Some(1.25));
    assert_eq!(parse_threshold("-0,1"), Some(-0.1));
    assert_eq!(parse_threshold("siehe Text"), None);
}

#[test]
fn finds_table_by_header_marker() {
    let other: TableText = vec![vec!["Name".to_string(), "Wert".to_string()]];
    let tables = vec![other, normal_range_table()];

    let found = find_threshold_table(&tables, &ThresholdSettings::default()).unwrap();
    assert_eq!(found[1][0], "KidneyRisk");

    assert!(find_threshold_table(&tables[..1], &ThresholdSettings::default()).is_none());
}

#[test]
fn chooses_words_by_threshold() {
    let scores: ScoreSet = [
        ("CKD_score".to_string(), 0.2),
        ("CAD_score".to_string(), 0.3),
        ("HF_score".to_string(), 2.0),
        ("Onkorisk_score".to_string(), 0.1),
    ]
    .into_iter()
    .collect();

    let sentences = evaluate(&normal_range_table(), &ThresholdSettings::default(), &scores);

    assert_eq!(sentences["ckd_sentence"], "keine");
    // Equal to the threshold is not below it.
    assert_eq!(sentences["cad_sentence"], "eine");
    assert_eq!(sentences["hf_sentence"], "eine");
    // Unreadable threshold.
    assert_eq!(sentences["onco_sentence"], "eine");
}

#[test]
fn missing_score_counts_as_zero() {
    let sentences = evaluate(
        &normal_range_table(),
        &ThresholdSettings::default(),
        &ScoreSet::new(),
    );
    assert_eq!(sentences["ckd_sentence"], "keine");
    assert_eq!(sentences["hf_sentence"], "keine");
}

#[test]
fn compares_rounded_value() {
    let scores: ScoreSet = [("CKD_score".to_string(), 0.4996)].into_iter().collect();
    let sentences = evaluate(&normal_range_table(), &ThresholdSettings::default(), &scores);
    assert_eq!(sentences["ckd_sentence"], "eine");
}
