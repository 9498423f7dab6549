use std::path::{Path, PathBuf};

use jiff::civil::Date;
use tracing::info;

use repgen_core::models::patient::{PatientQuery, PatientRecord};
use repgen_core::models::template::{Language, TemplateKind};
use repgen_core::naming::{output_docx_path, template_candidates};
use repgen_export::render_to_file;
use repgen_store::PatientStore;

use crate::context::{ContextBuilder, ContextInput, MissingDataPolicy, MissingItem};
use crate::error::ReportError;

/// One report to produce.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub query: PatientQuery,
    pub kind: TemplateKind,
    pub lang: Language,
    /// Holds the score spreadsheets and figures.
    pub workdir: PathBuf,
    pub templates_dir: PathBuf,
    /// Where the filled document is written.
    pub out_dir: PathBuf,
    pub report_date: Date,
    pub policy: MissingDataPolicy,
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub docx: PathBuf,
    pub template: PathBuf,
    pub record: PatientRecord,
    pub missing: Vec<MissingItem>,
}

/// The template for `kind` in `lang`, falling back from an English variant
/// to the German base.
pub fn resolve_template(
    templates_dir: &Path,
    kind: TemplateKind,
    lang: Language,
) -> Result<PathBuf, ReportError> {
    let candidates = template_candidates(templates_dir, kind, lang);
    match candidates.iter().find(|p| p.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(ReportError::TemplateNotFound { candidates }),
    }
}

/// Build the context for the request and write the filled Word document.
pub fn generate(
    builder: &mut ContextBuilder<'_>,
    store: &PatientStore,
    request: &GenerateRequest,
) -> Result<GeneratedReport, ReportError> {
    let template = resolve_template(&request.templates_dir, request.kind, request.lang)?;

    let built = builder.build(
        store,
        &ContextInput {
            query: &request.query,
            workdir: &request.workdir,
            kind: request.kind,
            lang: request.lang,
            report_date: request.report_date,
            template: &template,
            policy: request.policy,
        },
    )?;

    let docx = output_docx_path(&request.out_dir, &built.record, request.kind, request.lang);
    render_to_file(&template, &built.context, &docx)?;

    info!(
        kind = %request.kind,
        docx = %docx.display(),
        missing = built.missing.len(),
        "report generated"
    );

    Ok(GeneratedReport {
        docx,
        template,
        record: built.record,
        missing: built.missing,
    })
}
