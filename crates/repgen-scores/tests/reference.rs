use repgen_scores::error::ScoreError;
use repgen_scores::reference::{read_reference, reference_from_grid};
use repgen_scores::workbook::Cell;
use rust_xlsxwriter::Workbook;

#[test]
fn splits_scores_by_group() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CKD_273.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "sample").unwrap();
    sheet.write_string(0, 1, "group").unwrap();
    sheet.write_string(0, 2, "score").unwrap();
    let rows = [(0.0, -0.4), (0.0, -0.1), (1.0, 0.9), (2.0, 5.0), (1.0, 1.2)];
    for (i, (group, score)) in rows.iter().enumerate() {
        let row = 1 + i as u32;
        sheet.write_string(row, 0, format!("P{row}")).unwrap();
        sheet.write_number(row, 1, *group).unwrap();
        sheet.write_number(row, 2, *score).unwrap();
    }
    sheet.write_number(6, 1, 0.0).unwrap();
    sheet.write_string(6, 2, "n/a").unwrap();
    workbook.save(&path).unwrap();

    let reference = read_reference(&path).unwrap();
    assert_eq!(reference.healthy, vec![-0.4, -0.1]);
    assert_eq!(reference.affected, vec![0.9, 1.2]);
}

#[test]
fn header_may_start_below_empty_rows() {
    let grid = vec![
        vec![],
        vec![Cell::Empty, Cell::text("Score"), Cell::text("Group")],
        vec![Cell::Empty, Cell::text("0,25"), Cell::text("1")],
        vec![Cell::Empty, Cell::Number(-0.5), Cell::Number(0.0)],
    ];
    let reference = reference_from_grid(&grid).unwrap();
    assert_eq!(reference.healthy, vec![-0.5]);
    assert_eq!(reference.affected, vec![0.25]);
}

#[test]
fn missing_score_column_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("HF2.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "group").unwrap();
    sheet.write_number(1, 0, 1.0).unwrap();
    workbook.save(&path).unwrap();

    match read_reference(&path).unwrap_err() {
        ScoreError::MissingColumn { path, column } => {
            assert!(path.ends_with("HF2.xlsx"));
            assert_eq!(column, "score");
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn missing_reference_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_reference(&dir.path().join("CAD_238.xlsx")).unwrap_err();
    assert!(matches!(err, ScoreError::MissingScoreFile { .. }));
}
