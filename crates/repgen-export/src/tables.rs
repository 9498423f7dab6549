//! Plain-text view of the tables in a template body.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExportError;
use crate::package::{DOCUMENT_PART, DocxPackage};
use crate::xml;

static TABLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)w:(tbl|tr|tc|p|t)(?:\s[^>]*)?(/?)>").expect("static regex")
});

/// Every table in the template body as rows of cell texts. Paragraphs
/// within a cell are joined with `\n`. Nested tables are listed after the
/// table that contains them.
pub fn read_tables(template: &Path) -> Result<Vec<Vec<Vec<String>>>, ExportError> {
    let package = DocxPackage::open(template)?;
    let document = package
        .part_text(DOCUMENT_PART)?
        .ok_or_else(|| ExportError::Package(format!("missing {DOCUMENT_PART}")))?;
    Ok(tables_in(&document))
}

#[derive(Default)]
struct OpenTable {
    slot: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

pub fn tables_in(document_xml: &str) -> Vec<Vec<Vec<String>>> {
    let mut done: Vec<Vec<Vec<String>>> = Vec::new();
    let mut open: Vec<OpenTable> = Vec::new();
    let mut text_start: Option<usize> = None;

    for caps in TABLE_TOKEN.captures_iter(document_xml) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();

        match (name.as_str(), closing) {
            ("tbl", false) if !self_closing => {
                done.push(Vec::new());
                open.push(OpenTable {
                    slot: done.len() - 1,
                    ..OpenTable::default()
                });
            }
            ("tbl", true) => {
                if let Some(table) = open.pop() {
                    done[table.slot] = table.rows;
                }
            }
            ("tr", false) if !self_closing => {
                if let Some(table) = open.last_mut() {
                    table.row = Some(Vec::new());
                }
            }
            ("tr", true) => {
                if let Some(table) = open.last_mut() {
                    if let Some(row) = table.row.take() {
                        table.rows.push(row);
                    }
                }
            }
            ("tc", false) if !self_closing => {
                if let Some(table) = open.last_mut() {
                    table.cell = Some(String::new());
                }
            }
            ("tc", true) => {
                if let Some(table) = open.last_mut() {
                    let cell = table.cell.take().unwrap_or_default();
                    if let Some(row) = table.row.as_mut() {
                        row.push(cell.trim().to_string());
                    }
                }
            }
            ("p", false) => {
                if let Some(cell) = open.last_mut().and_then(|t| t.cell.as_mut()) {
                    if !cell.is_empty() {
                        cell.push('\n');
                    }
                }
            }
            ("t", false) if !self_closing => text_start = Some(whole.end()),
            ("t", true) => {
                let start = text_start.take();
                let cell = open.last_mut().and_then(|t| t.cell.as_mut());
                if let (Some(start), Some(cell)) = (start, cell) {
                    cell.push_str(&xml::unescape(&document_xml[start..whole.start()]));
                }
            }
            _ => {}
        }
    }

    done
}
