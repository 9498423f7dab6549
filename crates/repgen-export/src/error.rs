use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("template {template} needs values for: {}", .missing.join(", "))]
    TemplateMismatch {
        template: String,
        missing: Vec<String>,
    },

    #[error("invalid document package: {0}")]
    Package(String),

    #[error("DOCX generation failed: {0}")]
    Docx(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("no PDF converter available (tried {})", .tried.join(", "))]
    ConverterUnavailable { tried: Vec<String> },

    #[error("{converter} failed: {reason}")]
    ConverterFailed { converter: String, reason: String },

    #[error("PDF conversion failed: {}", format_attempts(.attempts))]
    ConversionFailed { attempts: Vec<(String, String)> },
}

impl From<tera::Error> for ExportError {
    fn from(e: tera::Error) -> Self {
        // Tera keeps the useful part in the source chain.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        ExportError::TemplateRender(message)
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::Package(e.to_string())
    }
}

pub(crate) fn io_err(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn format_attempts(attempts: &[(String, String)]) -> String {
    attempts
        .iter()
        .map(|(name, reason)| format!("{name}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}
