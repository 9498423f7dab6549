//! repgen-scores
//!
//! Reads analysis scores out of classification spreadsheets and turns them
//! into a [`ScoreSet`]. Also evaluates the normal-range threshold sentences
//! printed next to the scores in the report, and reads the reference
//! populations the score distributions are drawn from.

pub mod error;
pub mod extract;
pub mod reference;
pub mod source;
pub mod thresholds;
pub mod workbook;

use std::path::Path;

use tracing::info;

use repgen_core::models::score::ScoreSet;

use crate::error::ScoreError;
use crate::source::ScoreSource;

/// Load one category spreadsheet from `workdir`.
pub fn load_source(workdir: &Path, source: &ScoreSource) -> Result<ScoreSet, ScoreError> {
    let path = workdir.join(&source.file_name);
    if !path.is_file() {
        return Err(ScoreError::MissingScoreFile {
            path: path.display().to_string(),
        });
    }

    let grid = workbook::read_first_sheet(&path)?;
    let scores = extract::extract_scores(&grid, source).map_err(|e| e.with_path(&path))?;

    info!(
        file = %source.file_name,
        scores = scores.len(),
        "scores loaded"
    );
    Ok(scores)
}

/// Load and merge every configured source. Fails on the first missing or
/// malformed spreadsheet.
pub fn load_scores(workdir: &Path, sources: &[ScoreSource]) -> Result<ScoreSet, ScoreError> {
    let mut scores = ScoreSet::new();
    for source in sources {
        scores.merge(load_source(workdir, source)?);
    }
    Ok(scores)
}
