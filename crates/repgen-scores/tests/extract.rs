use repgen_scores::error::ScoreError;
use repgen_scores::extract::extract_scores;
use repgen_scores::source::{ColumnMapping, ScoreSource};
use repgen_scores::workbook::Cell;

fn classification_grid() -> Vec<Vec<Cell>> {
    vec![
        vec![Cell::text("Klassifikation")],
        vec![],
        vec![
            Cell::text("Sample"),
            Cell::text("Typ"),
            Cell::text("CAD238ML1k.mdl"),
            Cell::text("CKD273ML1hybrid"),
            Cell::text("HF2_ML1new.mdl"),
            Cell::text("oncoRisk normo"),
            Cell::text("BioAge"),
        ],
        vec![
            Cell::text("338252"),
            Cell::text("raw"),
            Cell::Number(1.0),
            Cell::Number(2.0),
            Cell::Number(3.0),
            Cell::Number(4.0),
            Cell::Number(50.0),
        ],
        vec![
            Cell::Empty,
            Cell::text("Final Score"),
            Cell::Number(-0.4567),
            Cell::Number(0.12345),
            Cell::text("1,5"),
            Cell::Number(0.9),
            Cell::Number(47.25),
        ],
    ]
}

#[test]
fn reads_final_score_row_under_mapped_headers() {
    let scores = extract_scores(&classification_grid(), &ScoreSource::classification()).unwrap();

    assert_eq!(scores.get("CAD_score"), Some(-0.4567));
    assert_eq!(scores.get("CKD_score"), Some(0.12345));
    assert_eq!(scores.get("HF_score"), Some(1.5));
    assert_eq!(scores.get("Onkorisk_score"), Some(0.9));
    assert_eq!(scores.get("BioAge_value"), Some(47.25));
}

#[test]
fn headers_missing_from_sheet_are_skipped() {
    let scores = extract_scores(&classification_grid(), &ScoreSource::classification()).unwrap();
    assert_eq!(scores.get("LifeSpeed_value"), None);
    assert_eq!(scores.len(), 5);
}

#[test]
fn missing_marker_row_is_an_error() {
    let mut grid = classification_grid();
    grid.pop();

    let err = extract_scores(&grid, &ScoreSource::classification()).unwrap_err();
    assert!(matches!(err, ScoreError::NoFinalScoreRow { .. }));
}

#[test]
fn non_numeric_score_is_an_error() {
    let mut grid = classification_grid();
    grid[4][3] = Cell::text("n/a");

    let err = extract_scores(&grid, &ScoreSource::classification()).unwrap_err();
    match err {
        ScoreError::NonNumericScore { column, value, .. } => {
            assert_eq!(column, "CKD273ML1hybrid");
            assert_eq!(value, "n/a");
        }
        other => panic!("expected NonNumericScore, got {other:?}"),
    }
}

#[test]
fn custom_source_layout() {
    let grid = vec![
        vec![Cell::text("marker"), Cell::text("Score A")],
        vec![Cell::text("FINAL SCORE total"), Cell::Number(7.0)],
    ];
    let source = ScoreSource {
        file_name: "custom.xlsx".to_string(),
        header_row: 0,
        marker_column: 0,
        marker: "final score".to_string(),
        columns: vec![ColumnMapping::new("Score A", "a_score")],
    };

    let scores = extract_scores(&grid, &source).unwrap();
    assert_eq!(scores.get("a_score"), Some(7.0));
}
