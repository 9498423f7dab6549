use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score file not found: {path}")]
    MissingScoreFile { path: String },

    #[error("failed to read workbook {path}: {reason}")]
    Workbook { path: String, reason: String },

    #[error("workbook {path} has no worksheets")]
    EmptyWorkbook { path: String },

    #[error("header row {row} missing in {path}")]
    HeaderRowMissing { path: String, row: usize },

    #[error("no '{marker}' row found in {path}")]
    NoFinalScoreRow { path: String, marker: String },

    #[error("column '{column}' missing in {path}")]
    MissingColumn { path: String, column: String },

    #[error("score '{column}' in {path} is not numeric: {value}")]
    NonNumericScore {
        path: String,
        column: String,
        value: String,
    },
}

impl ScoreError {
    /// Fill in the file path for errors raised by the path-agnostic extractor.
    pub(crate) fn with_path(self, path: &Path) -> Self {
        let display = path.display().to_string();
        match self {
            ScoreError::HeaderRowMissing { row, .. } => ScoreError::HeaderRowMissing {
                path: display,
                row,
            },
            ScoreError::NoFinalScoreRow { marker, .. } => ScoreError::NoFinalScoreRow {
                path: display,
                marker,
            },
            ScoreError::NonNumericScore { column, value, .. } => ScoreError::NonNumericScore {
                path: display,
                column,
                value,
            },
            ScoreError::MissingColumn { column, .. } => ScoreError::MissingColumn {
                path: display,
                column,
            },
            other => other,
        }
    }
}
