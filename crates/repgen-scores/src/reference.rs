//! Reference population workbooks behind the distribution plots.
//!
//! The first sheet has a header row with a `group` column (0 healthy,
//! 1 affected) and a `score` column. Rows with any other group or a
//! non-numeric score are ignored.

use std::path::Path;

use tracing::debug;

use crate::error::ScoreError;
use crate::workbook::{Cell, read_first_sheet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceScores {
    pub healthy: Vec<f64>,
    pub affected: Vec<f64>,
}

pub fn read_reference(path: &Path) -> Result<ReferenceScores, ScoreError> {
    if !path.is_file() {
        return Err(ScoreError::MissingScoreFile {
            path: path.display().to_string(),
        });
    }
    let grid = read_first_sheet(path)?;
    let reference = reference_from_grid(&grid).map_err(|e| e.with_path(path))?;
    debug!(
        path = %path.display(),
        healthy = reference.healthy.len(),
        affected = reference.affected.len(),
        "reference scores loaded"
    );
    Ok(reference)
}

/// Split the score column by group. The header is the first non-empty row.
pub fn reference_from_grid(grid: &[Vec<Cell>]) -> Result<ReferenceScores, ScoreError> {
    let Some(header_idx) = grid
        .iter()
        .position(|row| row.iter().any(|c| *c != Cell::Empty))
    else {
        return Err(missing_column("group"));
    };
    let header = &grid[header_idx];

    let column = |name: &str| {
        header
            .iter()
            .position(|c| c.as_text().trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| missing_column(name))
    };
    let group_col = column("group")?;
    let score_col = column("score")?;

    let mut reference = ReferenceScores::default();
    for row in &grid[header_idx + 1..] {
        let group = row.get(group_col).and_then(Cell::as_number);
        let Some(score) = row.get(score_col).and_then(Cell::as_number) else {
            continue;
        };
        match group {
            Some(g) if g == 0.0 => reference.healthy.push(score),
            Some(g) if g == 1.0 => reference.affected.push(score),
            _ => {}
        }
    }

    Ok(reference)
}

fn missing_column(column: &str) -> ScoreError {
    ScoreError::MissingColumn {
        path: String::new(),
        column: column.to_string(),
    }
}
