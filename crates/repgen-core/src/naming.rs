//! File naming conventions.
//!
//! Pure path functions. These define where templates are looked up and where
//! generated documents land.

use std::path::{Path, PathBuf};

use crate::models::patient::PatientRecord;
use crate::models::template::{Language, TemplateKind};

/// Candidate template paths for a kind and language, most specific first.
///
/// English looks for `<base>_EN.docx` and falls back to the German base.
pub fn template_candidates(templates_dir: &Path, kind: TemplateKind, lang: Language) -> Vec<PathBuf> {
    let base = kind.base_file_name();
    let mut candidates = Vec::with_capacity(2);
    if lang == Language::En {
        let stem = base.trim_end_matches(".docx");
        candidates.push(templates_dir.join(format!("{stem}_EN.docx")));
    }
    candidates.push(templates_dir.join(base));
    candidates
}

/// `<last>_<first>_<Label>_<LANG>.docx`
pub fn output_docx_name(record: &PatientRecord, kind: TemplateKind, lang: Language) -> String {
    format!(
        "{}_{}_{}_{}.docx",
        sanitize_component(&record.last_name),
        sanitize_component(&record.first_name),
        kind.output_label(),
        lang.code(),
    )
}

pub fn output_docx_path(
    out_dir: &Path,
    record: &PatientRecord,
    kind: TemplateKind,
    lang: Language,
) -> PathBuf {
    out_dir.join(output_docx_name(record, kind, lang))
}

/// Where a converter writes the PDF for `docx`: same stem, `.pdf`, in `out_dir`.
pub fn pdf_path_for(docx: &Path, out_dir: &Path) -> PathBuf {
    let stem = docx
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}.pdf"))
}

/// Placeholder name for figure `number` in a template of `kind`.
pub fn figure_placeholder(kind: TemplateKind, number: u32) -> String {
    format!("{}{number}", kind.figure_prefix())
}

/// Replace path separators so a name can never escape the output directory.
fn sanitize_component(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}
