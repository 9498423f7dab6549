use std::collections::BTreeSet;
use std::path::Path;

use tera::{Context, Tera};
use tracing::{debug, info};

use repgen_core::models::context::{ContextMap, FigureRef};

use crate::drawing::{self, EmbeddedImage};
use crate::error::{ExportError, io_err};
use crate::package::{CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART, DocxPackage};
use crate::placeholders::{normalize_tags, required_placeholders};
use crate::xml;

/// Fill a `.docx` template with `context` and return the new document bytes.
///
/// Every placeholder the template uses must have a value; otherwise
/// nothing is rendered and `TemplateMismatch` lists all missing names.
pub fn render_template(template: &Path, context: &ContextMap) -> Result<Vec<u8>, ExportError> {
    let package = DocxPackage::open(template)?;
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| template.display().to_string());
    render_package(package, &name, context)
}

/// Render `template` and write the result to `out`.
pub fn render_to_file(template: &Path, context: &ContextMap, out: &Path) -> Result<(), ExportError> {
    let bytes = render_template(template, context)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    std::fs::write(out, &bytes).map_err(io_err(out))?;
    info!(
        template = %template.display(),
        output = %out.display(),
        bytes = bytes.len(),
        "document rendered"
    );
    Ok(())
}

pub fn render_package(
    mut package: DocxPackage,
    template_name: &str,
    context: &ContextMap,
) -> Result<Vec<u8>, ExportError> {
    let document = package
        .part_text(DOCUMENT_PART)?
        .map(|xml| normalize_tags(&xml))
        .ok_or_else(|| ExportError::Package(format!("missing {DOCUMENT_PART}")))?;

    let mut side_parts = Vec::new();
    for name in package.header_footer_parts() {
        if let Some(xml) = package.part_text(&name)? {
            side_parts.push((name, normalize_tags(&xml)));
        }
    }

    // Pictures are only placed in the body, so headers and footers need text.
    let body_names = required_placeholders(&document);
    let mut missing: BTreeSet<String> = body_names
        .iter()
        .filter(|name| !context.contains_key(name))
        .cloned()
        .collect();
    for (_, xml) in &side_parts {
        missing.extend(
            required_placeholders(xml)
                .into_iter()
                .filter(|name| context.text(name).is_none()),
        );
    }
    if !missing.is_empty() {
        return Err(ExportError::TemplateMismatch {
            template: template_name.to_string(),
            missing: missing.into_iter().collect(),
        });
    }

    let mut next_id = drawing::next_doc_pr_id(&document);
    let mut images: Vec<(EmbeddedImage, &FigureRef)> = Vec::new();
    for (key, figure) in context.images() {
        if body_names.contains(key) {
            images.push((EmbeddedImage::new(key, figure, next_id), figure));
            next_id += 1;
        }
    }

    let body_context = tera_context(context, &images);
    let rendered = Tera::one_off(&document, &body_context, false)?;
    package.set_part(DOCUMENT_PART, rendered.into_bytes());

    let text_context = tera_context(context, &[]);
    for (name, xml) in side_parts {
        let rendered = Tera::one_off(&xml, &text_context, false)?;
        package.set_part(&name, rendered.into_bytes());
    }

    if !images.is_empty() {
        embed_images(&mut package, &images)?;
    }
    debug!(
        template = template_name,
        values = context.len(),
        images = images.len(),
        "template filled"
    );

    package.to_bytes()
}

fn tera_context(context: &ContextMap, images: &[(EmbeddedImage, &FigureRef)]) -> Context {
    let mut ctx = Context::new();
    for (key, value) in context.iter() {
        if let Some(text) = value.as_text() {
            ctx.insert(key, &xml::escape(&text));
        }
    }
    for (image, _) in images {
        ctx.insert(image.placeholder.as_str(), &drawing::inline_run_markup(image));
    }
    ctx
}

fn embed_images(
    package: &mut DocxPackage,
    images: &[(EmbeddedImage, &FigureRef)],
) -> Result<(), ExportError> {
    for (image, figure) in images {
        package.set_part(&image.part_name(), figure.png.clone());
    }

    let placed: Vec<EmbeddedImage> = images.iter().map(|(image, _)| image.clone()).collect();
    let rels = match package.part_text(DOCUMENT_RELS_PART)? {
        Some(xml) => drawing::add_relationships(&xml, &placed),
        None => drawing::add_relationships("", &placed),
    };
    package.set_part(DOCUMENT_RELS_PART, rels.into_bytes());

    let content_types = package
        .part_text(CONTENT_TYPES_PART)?
        .ok_or_else(|| ExportError::Package(format!("missing {CONTENT_TYPES_PART}")))?;
    package.set_part(
        CONTENT_TYPES_PART,
        drawing::ensure_png_content_type(&content_types).into_bytes(),
    );
    Ok(())
}
