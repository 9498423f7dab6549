//! Placeholder context for one report.
//!
//! Gathers the patient record, the analysis scores with their threshold
//! sentences, and the prepared figures into one [`ContextMap`].

use std::fmt;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use repgen_core::models::context::ContextMap;
use repgen_core::models::patient::{PatientQuery, PatientRecord};
use repgen_core::models::score::{SCORE_DECIMALS, ScoreSet};
use repgen_core::models::template::{Language, TemplateKind};
use repgen_core::naming::figure_placeholder;
use repgen_export::tables::read_tables;
use repgen_figures::discover::discover_figures;
use repgen_figures::error::FigureError;
use repgen_figures::fonts::FontResolver;
use repgen_figures::{missing_figures, prepare_figure};
use repgen_scores::error::ScoreError;
use repgen_scores::load_source;
use repgen_scores::thresholds::{evaluate, find_threshold_table};
use repgen_store::PatientStore;

use crate::distributions::stage_distributions;
use crate::error::ReportError;
use crate::settings::ReportSettings;

/// What to do when a score file or figure is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Abort the report.
    #[default]
    Strict,
    /// Leave the affected placeholders empty and carry on.
    Partial,
}

/// Input that was absent while building a partial context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingItem {
    ScoreFile { path: PathBuf },
    Figure { number: u32 },
}

impl fmt::Display for MissingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingItem::ScoreFile { path } => write!(f, "score file {}", path.display()),
            MissingItem::Figure { number } => write!(f, "figure {number}"),
        }
    }
}

pub struct ContextInput<'a> {
    pub query: &'a PatientQuery,
    pub workdir: &'a Path,
    pub kind: TemplateKind,
    pub lang: Language,
    pub report_date: Date,
    /// Template the context is for; its normal-range table drives the
    /// threshold sentences.
    pub template: &'a Path,
    pub policy: MissingDataPolicy,
}

#[derive(Debug, Clone)]
pub struct BuiltContext {
    pub record: PatientRecord,
    pub context: ContextMap,
    /// Empty unless the policy is `Partial`.
    pub missing: Vec<MissingItem>,
}

pub struct ContextBuilder<'a> {
    settings: &'a ReportSettings,
    fonts: FontResolver,
}

impl<'a> ContextBuilder<'a> {
    /// `fonts` supplies the overlay fonts; with no usable font the built-in
    /// one is used.
    pub fn new(settings: &'a ReportSettings, fonts: FontResolver) -> Self {
        Self { settings, fonts }
    }

    pub fn build(
        &mut self,
        store: &PatientStore,
        input: &ContextInput<'_>,
    ) -> Result<BuiltContext, ReportError> {
        if !input.workdir.is_dir() {
            return Err(ReportError::WorkdirNotFound(input.workdir.to_path_buf()));
        }

        let record = store.find(input.query)?;
        info!(
            patient_id = %record.patient_id,
            kind = %input.kind,
            lang = %input.lang,
            "building report context"
        );

        let mut context = patient_fields(&record, input.lang, input.report_date);
        let mut missing = Vec::new();

        let scores = if input.kind.includes_scores() {
            let (fields, scores) = self.score_fields(input, &mut missing)?;
            context.extend(fields);
            scores
        } else if self.settings.distributions.is_active() {
            self.plot_scores(input.workdir)
        } else {
            ScoreSet::new()
        };

        stage_distributions(input.workdir, &scores, input.lang, &self.settings.distributions);
        context.extend(self.figure_fields(input, &mut missing)?);

        debug!(values = context.len(), missing = missing.len(), "context built");
        Ok(BuiltContext {
            record,
            context,
            missing,
        })
    }

    fn score_fields(
        &self,
        input: &ContextInput<'_>,
        missing: &mut Vec<MissingItem>,
    ) -> Result<(ContextMap, ScoreSet), ReportError> {
        let mut context = ContextMap::new();
        let mut scores = ScoreSet::new();

        for source in &self.settings.score_sources {
            match load_source(input.workdir, source) {
                Ok(loaded) => scores.merge(loaded),
                Err(ScoreError::MissingScoreFile { path })
                    if input.policy == MissingDataPolicy::Partial =>
                {
                    warn!(%path, "score file missing, leaving its scores empty");
                    for key in source.keys() {
                        context.insert(key, "");
                    }
                    missing.push(MissingItem::ScoreFile { path: path.into() });
                }
                Err(e) => return Err(e.into()),
            }
        }

        for (key, value) in scores.iter() {
            context.insert_number(key, value, SCORE_DECIMALS);
        }

        let tables = read_tables(input.template)?;
        match find_threshold_table(&tables, &self.settings.thresholds) {
            Some(table) => {
                for (key, word) in evaluate(table, &self.settings.thresholds, &scores) {
                    context.insert(key, word);
                }
            }
            None => debug!(
                template = %input.template.display(),
                "no normal-range table, skipping threshold sentences"
            ),
        }

        Ok((context, scores))
    }

    /// Scores for the distribution plots of a kind that prints none.
    /// Unreadable sources are skipped.
    fn plot_scores(&self, workdir: &Path) -> ScoreSet {
        let mut scores = ScoreSet::new();
        for source in &self.settings.score_sources {
            match load_source(workdir, source) {
                Ok(loaded) => scores.merge(loaded),
                Err(e) => debug!(error = %e, "scores unavailable for distribution figures"),
            }
        }
        scores
    }

    fn figure_fields(
        &mut self,
        input: &ContextInput<'_>,
        missing: &mut Vec<MissingItem>,
    ) -> Result<ContextMap, ReportError> {
        let mut context = ContextMap::new();
        let figures = discover_figures(input.workdir)?;

        for number in missing_figures(&figures, self.settings.required_figures(input.kind)) {
            if input.policy == MissingDataPolicy::Strict {
                return Err(FigureError::MissingFigure {
                    number,
                    dir: input.workdir.display().to_string(),
                }
                .into());
            }
            warn!(figure = number, "figure missing, leaving placeholder empty");
            context.insert(figure_placeholder(input.kind, number), "");
            missing.push(MissingItem::Figure { number });
        }

        for file in &figures {
            let figure = prepare_figure(file, input.lang, &self.settings.figures, &mut self.fonts)?;
            context.insert_image(figure_placeholder(input.kind, file.number), figure);
        }

        Ok(context)
    }
}

/// Placeholders filled from the patient record for every template kind.
pub const PATIENT_FIELDS: &[&str] = &[
    "anrede",
    "vorname",
    "name",
    "dob",
    "geschlecht",
    "patient_id",
    "sample_id",
    "analysis_id",
    "sample_date",
    "address",
    "diagnosis",
    "report_date",
    "patient_sample",
];

/// Text values taken from the patient record, plus the salutation and the
/// report date (`DD.MM.YYYY`).
pub fn patient_fields(record: &PatientRecord, lang: Language, report_date: Date) -> ContextMap {
    let mut context = ContextMap::new();
    context.insert("anrede", lang.salutation(record.is_female()));
    context.insert("vorname", record.first_name.as_str());
    context.insert("name", record.last_name.as_str());
    context.insert("dob", record.dob.as_str());
    context.insert("geschlecht", record.gender.as_str());
    context.insert("patient_id", record.patient_id.as_str());
    context.insert("sample_id", record.sample_id.as_str());
    context.insert("analysis_id", record.analysis_id.as_str());
    context.insert("sample_date", record.sample_date.as_str());
    context.insert("address", record.address.as_str());
    context.insert("diagnosis", record.diagnosis.as_str());
    context.insert("report_date", report_date.strftime("%d.%m.%Y").to_string());
    context.insert("patient_sample", record.patient_sample());
    context
}
