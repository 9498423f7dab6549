use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::FigureError;

/// A figure file found in the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureFile {
    pub number: u32,
    pub path: PathBuf,
}

/// Figure number encoded in a file name of the form `<anything>_<digits>.png`.
pub fn figure_number(file_name: &str) -> Option<u32> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case("png") {
        return None;
    }
    let (_, suffix) = stem.rsplit_once('_')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// List numbered figures in `dir`, ordered by figure number.
///
/// Files are visited in name order; when two files carry the same number the
/// later name wins.
pub fn discover_figures(dir: &Path) -> Result<Vec<FigureFile>, FigureError> {
    let entries = std::fs::read_dir(dir).map_err(|e| FigureError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut names: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FigureError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push((name.to_string(), path.clone()));
        }
    }
    names.sort();

    let mut by_number: BTreeMap<u32, PathBuf> = BTreeMap::new();
    for (name, path) in names {
        let Some(number) = figure_number(&name) else {
            continue;
        };
        if let Some(previous) = by_number.insert(number, path) {
            warn!(
                number,
                replaced = %previous.display(),
                by = %name,
                "duplicate figure number"
            );
        }
    }

    let figures: Vec<FigureFile> = by_number
        .into_iter()
        .map(|(number, path)| FigureFile { number, path })
        .collect();
    debug!(dir = %dir.display(), count = figures.len(), "figures discovered");
    Ok(figures)
}
