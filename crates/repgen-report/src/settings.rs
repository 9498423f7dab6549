use serde::{Deserialize, Serialize};

use repgen_core::models::template::TemplateKind;
use repgen_figures::FigureSettings;
use repgen_scores::source::{ScoreSource, default_sources};
use repgen_scores::thresholds::ThresholdSettings;

use crate::distributions::DistributionSettings;

/// Figure numbers that must be present in the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredFigures {
    pub report: Vec<u32>,
    pub annex: Vec<u32>,
}

impl Default for RequiredFigures {
    fn default() -> Self {
        Self {
            report: (1..=6).collect(),
            annex: Vec::new(),
        }
    }
}

/// Everything that shapes a generated report besides the template itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub score_sources: Vec<ScoreSource>,
    pub thresholds: ThresholdSettings,
    pub figures: FigureSettings,
    pub required_figures: RequiredFigures,
    pub distributions: DistributionSettings,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            score_sources: default_sources(),
            thresholds: ThresholdSettings::default(),
            figures: FigureSettings::default(),
            required_figures: RequiredFigures::default(),
            distributions: DistributionSettings::default(),
        }
    }
}

impl ReportSettings {
    pub fn required_figures(&self, kind: TemplateKind) -> &[u32] {
        match kind {
            TemplateKind::Report => &self.required_figures.report,
            TemplateKind::Annex => &self.required_figures.annex,
        }
    }
}
