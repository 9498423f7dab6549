use tracing::{debug, warn};

use repgen_core::models::score::ScoreSet;

use crate::error::ScoreError;
use crate::source::ScoreSource;
use crate::workbook::Cell;

/// Pull the mapped scores out of a sheet grid.
///
/// Headers listed in the source but absent from the sheet are skipped; a
/// present header whose score cell is not numeric is an error. When a
/// header appears more than once the rightmost column wins.
pub fn extract_scores(grid: &[Vec<Cell>], source: &ScoreSource) -> Result<ScoreSet, ScoreError> {
    let headers = grid
        .get(source.header_row)
        .ok_or(ScoreError::HeaderRowMissing {
            path: String::new(),
            row: source.header_row,
        })?;

    let marker = source.marker.to_lowercase();
    let score_row = grid
        .iter()
        .find(|row| {
            row.get(source.marker_column)
                .is_some_and(|cell| cell.as_text().to_lowercase().contains(&marker))
        })
        .ok_or_else(|| ScoreError::NoFinalScoreRow {
            path: String::new(),
            marker: source.marker.clone(),
        })?;

    let mut scores = ScoreSet::new();
    for mapping in &source.columns {
        let Some(col) = headers
            .iter()
            .rposition(|h| h.as_text().trim() == mapping.column)
        else {
            debug!(column = %mapping.column, "score column not present, skipping");
            continue;
        };

        match score_row.get(col).unwrap_or(&Cell::Empty) {
            Cell::Empty => {
                warn!(column = %mapping.column, "score cell is empty, skipping");
            }
            cell => {
                let value = cell.as_number().ok_or_else(|| ScoreError::NonNumericScore {
                    path: String::new(),
                    column: mapping.column.clone(),
                    value: cell.as_text(),
                })?;
                scores.insert(mapping.key.clone(), value);
            }
        }
    }

    Ok(scores)
}
