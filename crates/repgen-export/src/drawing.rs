//! Inline pictures for the document body.

use std::sync::LazyLock;

use regex::Regex;

use repgen_core::models::context::FigureRef;

use crate::xml;

pub const EMU_PER_MM: f64 = 36_000.0;

const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

static DOC_PR_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<wp:docPr\s[^>]*\bid="(\d+)""#).expect("static regex"));

pub fn mm_to_emu(mm: f64) -> i64 {
    (mm * EMU_PER_MM).round() as i64
}

/// One figure placed into the package.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub placeholder: String,
    pub rel_id: String,
    /// Part name relative to `word/`, e.g. `media/repgen_fig1.png`.
    pub target: String,
    pub doc_pr_id: u32,
    pub cx: i64,
    pub cy: i64,
}

impl EmbeddedImage {
    pub fn new(placeholder: &str, figure: &FigureRef, doc_pr_id: u32) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            rel_id: format!("rIdRepgen{doc_pr_id}"),
            target: format!("media/repgen_{placeholder}.png"),
            doc_pr_id,
            cx: mm_to_emu(figure.width_mm),
            cy: mm_to_emu(figure.height_mm()),
        }
    }

    pub fn part_name(&self) -> String {
        format!("word/{}", self.target)
    }
}

/// First drawing id not used by the document yet.
pub fn next_doc_pr_id(document_xml: &str) -> u32 {
    DOC_PR_ID
        .captures_iter(document_xml)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

/// Markup that replaces a placeholder sitting inside `<w:t>`: closes the
/// text, adds the picture to the same run, and reopens the text.
pub fn inline_run_markup(image: &EmbeddedImage) -> String {
    let name = xml::escape(&image.placeholder);
    let EmbeddedImage {
        rel_id,
        doc_pr_id: id,
        cx,
        cy,
        ..
    } = image;

    format!(
        concat!(
            r#"</w:t><w:drawing>"#,
            r#"<wp:inline distT="0" distB="0" distL="0" distR="0" "#,
            r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="{name}"/>"#,
            r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks "#,
            r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/>"#,
            r#"</wp:cNvGraphicFramePr>"#,
            r#"<a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
            r#"<a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:nvPicPr><pic:cNvPr id="{id}" name="{name}.png"/><pic:cNvPicPr/></pic:nvPicPr>"#,
            r#"<pic:blipFill><a:blip r:embed="{rel_id}" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/>"#,
            r#"<a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline>"#,
            r#"</w:drawing><w:t xml:space="preserve">"#,
        ),
        cx = cx,
        cy = cy,
        id = id,
        name = name,
        rel_id = rel_id,
    )
}

/// Add one image relationship per embedded image.
pub fn add_relationships(rels_xml: &str, images: &[EmbeddedImage]) -> String {
    let entries: String = images
        .iter()
        .map(|image| {
            format!(
                r#"<Relationship Id="{}" Type="{IMAGE_REL_TYPE}" Target="{}"/>"#,
                image.rel_id, image.target
            )
        })
        .collect();

    match rels_xml.rfind("</Relationships>") {
        Some(end) => format!("{}{entries}{}", &rels_xml[..end], &rels_xml[end..]),
        None => empty_relationships(&entries),
    }
}

fn empty_relationships(entries: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            "{}</Relationships>"
        ),
        entries
    )
}

/// Make sure `.png` parts have a content type.
pub fn ensure_png_content_type(content_types_xml: &str) -> String {
    let lower = content_types_xml.to_ascii_lowercase();
    if lower.contains(r#"extension="png""#) {
        return content_types_xml.to_string();
    }

    let default = r#"<Default Extension="png" ContentType="image/png"/>"#;
    match content_types_xml.find("<Default ").or_else(|| content_types_xml.find("<Override ")) {
        Some(at) => format!(
            "{}{default}{}",
            &content_types_xml[..at],
            &content_types_xml[at..]
        ),
        None => match content_types_xml.rfind("</Types>") {
            Some(end) => format!(
                "{}{default}{}",
                &content_types_xml[..end],
                &content_types_xml[end..]
            ),
            None => content_types_xml.to_string(),
        },
    }
}
