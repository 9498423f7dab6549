use std::io::Cursor;
use std::path::Path;

use ab_glyph::{Font, PxScale};
use image::{ImageFormat, Rgba};
use imageproc::drawing::draw_text_mut;
use serde::{Deserialize, Serialize};

use repgen_core::models::template::Language;

use crate::error::FigureError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayText {
    pub de: String,
    pub en: String,
}

impl OverlayText {
    pub fn for_language(&self, lang: Language) -> &str {
        match lang {
            Language::De => &self.de,
            Language::En => &self.en,
        }
    }
}

/// Text drawn onto one or more figures before they are inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayRule {
    pub figures: Vec<u32>,
    pub text: OverlayText,
    /// Top-left corner of the text, in pixels.
    pub x: i32,
    pub y: i32,
    pub font_size: f32,
    #[serde(default = "white")]
    pub color: [u8; 4],
    /// Font files to try, in order.
    pub fonts: Vec<String>,
}

fn white() -> [u8; 4] {
    [255, 255, 255, 255]
}

pub fn default_rules() -> Vec<OverlayRule> {
    vec![
        OverlayRule {
            figures: vec![2],
            text: OverlayText {
                de: "IHR PROTEOMPROFIL".to_string(),
                en: "YOUR PROTEOME PROFILE".to_string(),
            },
            x: 100,
            y: 20,
            font_size: 18.0,
            color: white(),
            fonts: vec!["arial.ttf".to_string(), "DejaVuSans.ttf".to_string()],
        },
        OverlayRule {
            figures: vec![3, 4, 5, 6],
            text: OverlayText {
                de: "Ihr persönliches Biomarker-Profil".to_string(),
                en: "Your personal biomarker profile".to_string(),
            },
            x: 50,
            y: 18,
            font_size: 20.0,
            color: white(),
            fonts: vec!["DejaVuSans.ttf".to_string(), "arial.ttf".to_string()],
        },
    ]
}

/// Draw the rule's text onto a copy of `path` and return the PNG bytes and
/// pixel size of the result.
pub fn apply(
    path: &Path,
    rule: &OverlayRule,
    lang: Language,
    font: &impl Font,
) -> Result<(Vec<u8>, u32, u32), FigureError> {
    let image_err = |e: image::ImageError| FigureError::Image {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut canvas = image::open(path).map_err(image_err)?.to_rgba8();
    draw_text_mut(
        &mut canvas,
        Rgba(rule.color),
        rule.x,
        rule.y,
        PxScale::from(rule.font_size),
        font,
        rule.text.for_language(lang),
    );

    let (width, height) = canvas.dimensions();
    let mut png = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(image_err)?;

    Ok((png, width, height))
}
