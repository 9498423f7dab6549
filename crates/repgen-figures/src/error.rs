use thiserror::Error;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("figure {number} not found in {dir}")]
    MissingFigure { number: u32, dir: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode or encode image {path}: {reason}")]
    Image { path: String, reason: String },

    #[error("invalid font file: {path}")]
    InvalidFont { path: String },

    #[error("reference data for {model} has no {group} values")]
    EmptyReference { model: String, group: String },

    #[error("failed to draw distribution plot for {model}: {reason}")]
    Plot { model: String, reason: String },
}
