use std::path::PathBuf;

use thiserror::Error;

use repgen_core::error::CoreError;
use repgen_export::ExportError;
use repgen_figures::error::FigureError;
use repgen_scores::error::ScoreError;
use repgen_store::StoreError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Figure(#[from] FigureError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no template found, looked for: {}", format_paths(.candidates))]
    TemplateNotFound { candidates: Vec<PathBuf> },

    #[error("working directory not found: {}", .0.display())]
    WorkdirNotFound(PathBuf),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
