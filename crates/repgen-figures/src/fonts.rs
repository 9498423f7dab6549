use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, FontVec};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::FigureError;

/// Finds font files by name in a set of directories, remembering answers.
pub struct FontResolver {
    search_dirs: Vec<PathBuf>,
    resolved: HashMap<String, Option<PathBuf>>,
}

impl FontResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            resolved: HashMap::new(),
        }
    }

    /// Resolver over `extra` followed by the user and platform font
    /// directories.
    pub fn with_system_dirs(mut extra: Vec<PathBuf>) -> Self {
        extra.extend(system_font_dirs());
        Self::new(extra)
    }

    /// Resolve the first candidate that exists. Candidates are absolute or
    /// relative paths, or bare file names looked up case-insensitively in
    /// the search directories.
    pub fn resolve(&mut self, candidates: &[String]) -> Option<PathBuf> {
        candidates.iter().find_map(|candidate| self.resolve_one(candidate))
    }

    /// Resolve and parse the first usable candidate.
    pub fn load(&mut self, candidates: &[String]) -> Result<Option<FontVec>, FigureError> {
        match self.resolve(candidates) {
            Some(path) => load_font(&path).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_one(&mut self, candidate: &str) -> Option<PathBuf> {
        if let Some(hit) = self.resolved.get(candidate) {
            return hit.clone();
        }

        let direct = Path::new(candidate);
        let found = if direct.components().count() > 1 || direct.is_absolute() {
            direct.is_file().then(|| direct.to_path_buf())
        } else {
            self.search(candidate)
        };

        debug!(font = candidate, found = ?found, "font lookup");
        self.resolved.insert(candidate.to_string(), found.clone());
        found
    }

    fn search(&self, file_name: &str) -> Option<PathBuf> {
        self.search_dirs.iter().find_map(|dir| {
            WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(Result::ok)
                .find(|entry| {
                    entry.file_type().is_file()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
                })
                .map(|entry| entry.into_path())
        })
    }
}

/// DejaVu Sans, drawn with when no configured font resolves.
pub static BUILTIN_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub fn builtin_font() -> Result<FontArc, FigureError> {
    FontArc::try_from_slice(BUILTIN_FONT).map_err(|_| FigureError::InvalidFont {
        path: "built-in DejaVuSans.ttf".to_string(),
    })
}

pub fn load_font(path: &Path) -> Result<FontVec, FigureError> {
    let bytes = std::fs::read(path).map_err(|e| FigureError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    FontVec::try_from_vec(bytes).map_err(|_| FigureError::InvalidFont {
        path: path.display().to_string(),
    })
}

pub fn system_font_dirs() -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();
    if let Some(user) = dirs::font_dir() {
        found.push(user);
    }

    #[cfg(target_os = "linux")]
    found.extend(["/usr/share/fonts", "/usr/local/share/fonts"].map(PathBuf::from));

    #[cfg(target_os = "macos")]
    found.extend(["/Library/Fonts", "/System/Library/Fonts"].map(PathBuf::from));

    #[cfg(windows)]
    {
        let windir = std::env::var_os("WINDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        found.push(windir.join("Fonts"));
    }

    found.retain(|d| d.is_dir());
    found
}
