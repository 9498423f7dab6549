//! Score distribution figures.
//!
//! For each configured model the patient's score is plotted against the
//! model's reference population and written into the working directory as
//! a numbered figure, before figure discovery runs. Reference data is
//! optional: without it the figures are skipped and the report carries on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use repgen_core::models::score::ScoreSet;
use repgen_core::models::template::Language;
use repgen_figures::distribution::{DistributionPlot, PlotSettings, render_distribution};
use repgen_figures::error::FigureError;
use repgen_scores::reference::read_reference;

use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionModel {
    pub name: String,
    /// Reference workbook inside the data directory.
    pub data_file: String,
    /// Score keys tried in order for the patient's value.
    pub score_keys: Vec<String>,
    pub figure: u32,
    #[serde(default = "default_healthy_share")]
    pub healthy_share: f64,
    #[serde(default = "default_affected_share")]
    pub affected_share: f64,
    #[serde(default)]
    pub trim_outliers: bool,
}

fn default_healthy_share() -> f64 {
    0.88
}

fn default_affected_share() -> f64 {
    0.12
}

impl DistributionModel {
    fn new(name: &str, data_file: &str, score_keys: &[&str], figure: u32, trim: bool) -> Self {
        Self {
            name: name.to_string(),
            data_file: data_file.to_string(),
            score_keys: score_keys.iter().map(|k| k.to_string()).collect(),
            figure,
            healthy_share: default_healthy_share(),
            affected_share: default_affected_share(),
            trim_outliers: trim,
        }
    }
}

pub fn default_models() -> Vec<DistributionModel> {
    vec![
        DistributionModel::new("CKD", "CKD_273.xlsx", &["CKD_score"], 7, false),
        DistributionModel::new("CAD", "CAD_238.xlsx", &["CAD_score"], 8, true),
        DistributionModel::new("HF", "HF2.xlsx", &["HF_score"], 9, true),
        DistributionModel::new(
            "Oncorisk",
            "Oncorisk_norm.xlsx",
            &["Onkorisk_score", "Oncorisk_score"],
            10,
            true,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionSettings {
    pub enabled: bool,
    /// Directory holding the reference workbooks.
    pub data_dir: Option<PathBuf>,
    pub models: Vec<DistributionModel>,
    pub plot: PlotSettings,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            data_dir: None,
            models: default_models(),
            plot: PlotSettings::default(),
        }
    }
}

impl DistributionSettings {
    /// Whether staging will look for reference data at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.data_dir.is_some() && !self.models.is_empty()
    }
}

/// File name of a staged plot, e.g.
/// `CAD_distribution_plot_weighted_DE_noExtreme4_8.png`.
pub fn plot_file_name(model: &DistributionModel, lang: Language, lower_percentile: f64) -> String {
    let trimmed = if model.trim_outliers {
        format!("_noExtreme{lower_percentile}")
    } else {
        String::new()
    };
    format!(
        "{}_distribution_plot_weighted_{}{trimmed}_{}.png",
        model.name,
        lang.code(),
        model.figure
    )
}

/// Render and write every plot whose reference data and patient score are
/// available. Failures are logged and skipped; the written paths are
/// returned.
pub fn stage_distributions(
    workdir: &Path,
    scores: &ScoreSet,
    lang: Language,
    settings: &DistributionSettings,
) -> Vec<PathBuf> {
    if !settings.enabled {
        debug!("distribution figures disabled");
        return Vec::new();
    }
    let Some(data_dir) = settings.data_dir.as_deref() else {
        debug!("no reference data directory configured, skipping distribution figures");
        return Vec::new();
    };
    if !data_dir.is_dir() {
        warn!(
            dir = %data_dir.display(),
            "reference data directory not found, skipping distribution figures"
        );
        return Vec::new();
    }

    let mut staged = Vec::new();
    for model in &settings.models {
        let Some(score) = model.score_keys.iter().find_map(|k| scores.get(k)) else {
            debug!(model = %model.name, "no patient score, skipping distribution figure");
            continue;
        };
        match stage_one(workdir, data_dir, model, score, lang, &settings.plot) {
            Ok(path) => staged.push(path),
            Err(e) => warn!(
                model = %model.name,
                error = %e,
                "distribution figure skipped"
            ),
        }
    }
    staged
}

fn stage_one(
    workdir: &Path,
    data_dir: &Path,
    model: &DistributionModel,
    score: f64,
    lang: Language,
    plot: &PlotSettings,
) -> Result<PathBuf, ReportError> {
    let reference = read_reference(&data_dir.join(&model.data_file))?;
    let png = render_distribution(
        &DistributionPlot {
            model: &model.name,
            healthy: &reference.healthy,
            affected: &reference.affected,
            healthy_share: model.healthy_share,
            affected_share: model.affected_share,
            trim_outliers: model.trim_outliers,
            patient_score: score,
            lang,
        },
        plot,
    )?;

    // A plot left over from a run in the other language carries the same
    // figure number and would shadow this one.
    let other = match lang {
        Language::De => Language::En,
        Language::En => Language::De,
    };
    let stale = workdir.join(plot_file_name(model, other, plot.lower_percentile));
    if stale.is_file() {
        std::fs::remove_file(&stale).map_err(|e| FigureError::Io {
            path: stale.display().to_string(),
            source: e,
        })?;
        debug!(path = %stale.display(), "removed plot from an earlier run");
    }

    let path = workdir.join(plot_file_name(model, lang, plot.lower_percentile));
    std::fs::write(&path, png).map_err(|e| FigureError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    info!(
        model = %model.name,
        figure = model.figure,
        path = %path.display(),
        "distribution figure staged"
    );
    Ok(path)
}
