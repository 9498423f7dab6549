use serde::{Deserialize, Serialize};

/// Fonts and sizes used for generated starter templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStyles {
    /// Font for body text (e.g. "Calibri", "Arial").
    pub body_font: String,

    /// Font for headings.
    pub heading_font: String,

    /// Body text font size in points.
    pub body_size: usize,

    /// Heading 1 font size in points.
    pub heading1_size: usize,

    /// Heading 2 font size in points.
    pub heading2_size: usize,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Arial".to_string(),
            heading_font: "Arial".to_string(),
            body_size: 11,
            heading1_size: 16,
            heading2_size: 13,
        }
    }
}
