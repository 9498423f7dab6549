use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::ScoreError;

/// A spreadsheet cell reduced to what score extraction cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    /// Text form, as pandas `astype(str)` would show it.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Numeric value; text cells accept a decimal comma.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', ".").parse().ok(),
            Cell::Empty => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Read the first worksheet as a grid anchored at A1.
///
/// calamine ranges start at the first used cell, so leading empty rows and
/// columns are padded back in to keep row and column indices absolute.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Cell>>, ScoreError> {
    let display = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| ScoreError::Workbook {
        path: display.clone(),
        reason: e.to_string(),
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScoreError::EmptyWorkbook {
            path: display.clone(),
        })?
        .map_err(|e| ScoreError::Workbook {
            path: display.clone(),
            reason: e.to_string(),
        })?;

    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(Cell::from));
        grid.push(cells);
    }

    Ok(grid)
}
