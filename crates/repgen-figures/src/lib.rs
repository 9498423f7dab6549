//! repgen-figures
//!
//! Figure discovery in the working directory, page sizing, text overlays
//! drawn onto copies of the source images, and reference distribution
//! plots.

pub mod discover;
pub mod distribution;
pub mod error;
pub mod fonts;
pub mod overlay;
pub mod sizing;

use std::path::Path;

use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use repgen_core::models::context::FigureRef;
use repgen_core::models::template::Language;

use crate::discover::FigureFile;
use crate::error::FigureError;
use crate::fonts::FontResolver;
use crate::overlay::OverlayRule;
use crate::sizing::SizeRules;

/// Everything that decides how a discovered figure ends up on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSettings {
    #[serde(default)]
    pub sizes: SizeRules,
    #[serde(default = "overlay::default_rules")]
    pub overlays: Vec<OverlayRule>,
}

impl Default for FigureSettings {
    fn default() -> Self {
        Self {
            sizes: SizeRules::default(),
            overlays: overlay::default_rules(),
        }
    }
}

impl FigureSettings {
    pub fn overlay_for(&self, number: u32) -> Option<&OverlayRule> {
        self.overlays.iter().find(|rule| rule.figures.contains(&number))
    }
}

/// Load a figure, apply its overlay (if any) and size it.
///
/// The source file is never written to. When none of the overlay fonts can
/// be loaded the text is drawn with [`fonts::BUILTIN_FONT`].
pub fn prepare_figure(
    file: &FigureFile,
    lang: Language,
    settings: &FigureSettings,
    fonts: &mut FontResolver,
) -> Result<FigureRef, FigureError> {
    let width_mm = settings.sizes.width_for(file.number);

    let Some(rule) = settings.overlay_for(file.number) else {
        return read_untouched(&file.path, width_mm);
    };

    let font = match fonts.load(&rule.fonts) {
        Ok(Some(font)) => FontArc::new(font),
        Ok(None) => {
            warn!(
                figure = file.number,
                fonts = ?rule.fonts,
                "no overlay font found, using the built-in font"
            );
            crate::fonts::builtin_font()?
        }
        Err(e) => {
            warn!(
                figure = file.number,
                error = %e,
                "overlay font unusable, using the built-in font"
            );
            crate::fonts::builtin_font()?
        }
    };

    let (png, width_px, height_px) = overlay::apply(&file.path, rule, lang, &font)?;
    debug!(figure = file.number, "overlay applied");
    Ok(FigureRef {
        source: file.path.clone(),
        png,
        width_px,
        height_px,
        width_mm,
    })
}

fn read_untouched(path: &Path, width_mm: f64) -> Result<FigureRef, FigureError> {
    let png = std::fs::read(path).map_err(|e| FigureError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let (width_px, height_px) =
        image::image_dimensions(path).map_err(|e| FigureError::Image {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(FigureRef {
        source: path.to_path_buf(),
        png,
        width_px,
        height_px,
        width_mm,
    })
}

/// Figure numbers from `required` that are not in `found`.
pub fn missing_figures(found: &[FigureFile], required: &[u32]) -> Vec<u32> {
    required
        .iter()
        .copied()
        .filter(|n| !found.iter().any(|f| f.number == *n))
        .collect()
}
