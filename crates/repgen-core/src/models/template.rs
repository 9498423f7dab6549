use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The two documents the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// The main report, including scores and threshold sentences.
    Report,
    /// The annex: patient fields and figures only.
    Annex,
}

impl TemplateKind {
    /// File name of the German base template.
    pub fn base_file_name(&self) -> &'static str {
        match self {
            TemplateKind::Report => "template_MOS.docx",
            TemplateKind::Annex => "template_annex.docx",
        }
    }

    /// Prefix for figure placeholders: figure 3 becomes `fig3` / `annex_fig3`.
    pub fn figure_prefix(&self) -> &'static str {
        match self {
            TemplateKind::Report => "fig",
            TemplateKind::Annex => "annex_fig",
        }
    }

    /// Label used in output file names.
    pub fn output_label(&self) -> &'static str {
        match self {
            TemplateKind::Report => "Report",
            TemplateKind::Annex => "Annex",
        }
    }

    pub fn includes_scores(&self) -> bool {
        matches!(self, TemplateKind::Report)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Report => "report",
            TemplateKind::Annex => "annex",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "report" | "main" => Ok(TemplateKind::Report),
            "annex" => Ok(TemplateKind::Annex),
            _ => Err(CoreError::InvalidTemplateKind(s.to_string())),
        }
    }
}

/// Report language. German is the base; English templates are optional
/// variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "DE")]
    De,
    #[serde(rename = "EN")]
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::De => "DE",
            Language::En => "EN",
        }
    }

    pub fn salutation(&self, female: bool) -> &'static str {
        match (self, female) {
            (Language::De, true) => "Frau",
            (Language::De, false) => "Herr",
            (Language::En, true) => "Ms",
            (Language::En, false) => "Mr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DE" => Ok(Language::De),
            "EN" => Ok(Language::En),
            _ => Err(CoreError::InvalidLanguage(s.to_string())),
        }
    }
}
