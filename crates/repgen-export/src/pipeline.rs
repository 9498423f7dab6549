use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::convert::{Converter, default_converters};
use crate::error::ExportError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Per-converter limit.
    pub timeout_secs: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Tries converters in order until one produces a PDF.
pub struct ExportPipeline {
    converters: Vec<Box<dyn Converter>>,
    timeout: Duration,
}

impl Default for ExportPipeline {
    fn default() -> Self {
        Self::new(default_converters(), Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl ExportPipeline {
    pub fn new(converters: Vec<Box<dyn Converter>>, timeout: Duration) -> Self {
        Self {
            converters,
            timeout,
        }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self::new(
            default_converters(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Each converter's name and whether it can run here.
    pub fn availability(&self) -> Vec<(String, bool)> {
        self.converters
            .iter()
            .map(|c| (c.name().to_string(), c.is_available()))
            .collect()
    }

    /// Convert `docx` to a PDF next to it.
    pub fn export(&self, docx: &Path) -> Result<PathBuf, ExportError> {
        let out_dir = docx
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        self.export_to(docx, out_dir)
    }

    /// Convert `docx` to a PDF in `out_dir`. The Word document is never
    /// modified, whatever the outcome.
    pub fn export_to(&self, docx: &Path, out_dir: &Path) -> Result<PathBuf, ExportError> {
        if !docx.is_file() {
            return Err(ExportError::DocumentNotFound(docx.to_path_buf()));
        }

        let available: Vec<&dyn Converter> = self
            .converters
            .iter()
            .map(|c| &**c)
            .filter(|c| c.is_available())
            .collect();
        if available.is_empty() {
            return Err(ExportError::ConverterUnavailable {
                tried: self.converters.iter().map(|c| c.name().to_string()).collect(),
            });
        }

        let mut attempts = Vec::new();
        for converter in available {
            match converter.convert(docx, out_dir, self.timeout) {
                Ok(pdf) if pdf.is_file() => {
                    info!(converter = converter.name(), pdf = %pdf.display(), "PDF written");
                    return Ok(pdf);
                }
                Ok(pdf) => {
                    let reason = format!("reported {} but the file is missing", pdf.display());
                    warn!(converter = converter.name(), %reason, "conversion failed");
                    attempts.push((converter.name().to_string(), reason));
                }
                Err(e) => {
                    warn!(converter = converter.name(), error = %e, "conversion failed, trying next");
                    attempts.push((converter.name().to_string(), e.to_string()));
                }
            }
        }

        Err(ExportError::ConversionFailed { attempts })
    }
}
