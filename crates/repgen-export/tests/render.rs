use std::io::Cursor;
use std::path::{Path, PathBuf};

use docx_rs::{Docx, Paragraph, Run};

use repgen_core::models::context::{ContextMap, FigureRef};
use repgen_export::ExportError;
use repgen_export::package::{DocxPackage, DOCUMENT_PART};
use repgen_export::placeholders::{normalize_tags, required_placeholders};
use repgen_export::render::{render_package, render_template, render_to_file};

/// One paragraph per entry; each entry is a list of runs.
fn template_bytes(paragraphs: &[&[&str]]) -> Vec<u8> {
    let mut docx = Docx::new();
    for runs in paragraphs {
        let mut paragraph = Paragraph::new();
        for text in *runs {
            paragraph = paragraph.add_run(Run::new().add_text(*text));
        }
        docx = docx.add_paragraph(paragraph);
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    buf.into_inner()
}

fn write_template(dir: &Path, name: &str, paragraphs: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, template_bytes(paragraphs)).unwrap();
    path
}

fn document_xml(bytes: &[u8]) -> String {
    DocxPackage::from_bytes(bytes)
        .unwrap()
        .part_text(DOCUMENT_PART)
        .unwrap()
        .unwrap()
}

fn patient_context() -> ContextMap {
    let mut ctx = ContextMap::new();
    ctx.insert("anrede", "Frau");
    ctx.insert("name", "Müller & Söhne");
    ctx.insert("dob", "1980-01-01");
    ctx.insert_number("CKD_score", 0.12345, 3);
    ctx
}

fn figure(width_px: u32, height_px: u32, width_mm: f64) -> FigureRef {
    FigureRef {
        source: PathBuf::from("plot_1.png"),
        png: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
        width_px,
        height_px,
        width_mm,
    }
}

#[test]
fn fills_text_and_number_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        dir.path(),
        "template_MOS.docx",
        &[&["Sehr geehrte {{ anrede }} {{ name }},"], &["CKD: {{ CKD_score }}"]],
    );

    let xml = document_xml(&render_template(&template, &patient_context()).unwrap());
    assert!(xml.contains("Sehr geehrte Frau Müller &amp; Söhne,"));
    assert!(xml.contains("CKD: 0.123"));
    assert!(!xml.contains("{{"));
}

#[test]
fn missing_placeholders_are_all_reported() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        dir.path(),
        "template_annex.docx",
        &[&["{{ name }} {{ vorname }} {{ sample_id }}"]],
    );

    let err = render_template(&template, &patient_context()).unwrap_err();
    match err {
        ExportError::TemplateMismatch { template, missing } => {
            assert_eq!(template, "template_annex.docx");
            assert_eq!(missing, vec!["sample_id".to_string(), "vorname".to_string()]);
        }
        other => panic!("expected TemplateMismatch, got {other:?}"),
    }
}

#[test]
fn missing_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = render_template(&dir.path().join("nope.docx"), &ContextMap::new()).unwrap_err();
    assert!(matches!(err, ExportError::TemplateNotFound(_)));
}

#[test]
fn tags_split_across_runs_are_merged() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        dir.path(),
        "split.docx",
        &[&["Name: {{ na", "me }}"], &["{", "{ dob }", "}"]],
    );

    let xml = document_xml(&render_template(&template, &patient_context()).unwrap());
    assert!(xml.contains("Name: Müller &amp; Söhne"));
    assert!(xml.contains("1980-01-01"));
}

#[test]
fn same_context_gives_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(
        dir.path(),
        "template_MOS.docx",
        &[&["{{ anrede }} {{ name }}"], &["{{ fig1 }}"]],
    );
    let mut ctx = patient_context();
    ctx.insert_image("fig1", figure(200, 100, 150.0));

    let first = render_template(&template, &ctx).unwrap();
    let second = render_template(&template, &ctx).unwrap();
    assert_eq!(first, second);
}

#[test]
fn images_become_inline_pictures() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), "template_MOS.docx", &[&["{{ fig1 }}"]]);
    let mut ctx = ContextMap::new();
    ctx.insert_image("fig1", figure(200, 100, 150.0));
    ctx.insert_image("fig9", figure(10, 10, 80.0));

    let out = dir.path().join("out").join("report.docx");
    render_to_file(&template, &ctx, &out).unwrap();
    let package = DocxPackage::open(&out).unwrap();

    let xml = package.part_text(DOCUMENT_PART).unwrap().unwrap();
    assert!(xml.contains(r#"<wp:extent cx="5400000" cy="2700000"/>"#));
    assert!(xml.contains(r#"r:embed="rIdRepgen1""#));

    assert_eq!(
        package.part("word/media/repgen_fig1.png"),
        Some([0x89, b'P', b'N', b'G', 1, 2, 3].as_slice())
    );
    assert!(package.part("word/media/repgen_fig9.png").is_none());

    let rels = package
        .part_text("word/_rels/document.xml.rels")
        .unwrap()
        .unwrap();
    assert!(rels.contains(r#"Id="rIdRepgen1""#));
    assert!(rels.contains(r#"Target="media/repgen_fig1.png""#));

    let types = package.part_text("[Content_Types].xml").unwrap().unwrap();
    assert!(types.to_ascii_lowercase().contains(r#"extension="png""#));
}

#[test]
fn header_placeholders_need_text_values() {
    let mut package = DocxPackage::from_bytes(&template_bytes(&[&["{{ name }}"]])).unwrap();
    package.set_part(
        "word/header1.xml",
        br#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>{{ patient_id }} {{ fig1 }}</w:t></w:r></w:p></w:hdr>"#.to_vec(),
    );
    let mut ctx = patient_context();
    ctx.insert("patient_id", "P-001");
    ctx.insert_image("fig1", figure(10, 10, 80.0));

    let err = render_package(package.clone(), "with_header.docx", &ctx).unwrap_err();
    match err {
        ExportError::TemplateMismatch { missing, .. } => assert_eq!(missing, vec!["fig1"]),
        other => panic!("expected TemplateMismatch, got {other:?}"),
    }

    ctx.insert("fig1", "Abbildung 1");
    let bytes = render_package(package, "with_header.docx", &ctx).unwrap();
    let header = DocxPackage::from_bytes(&bytes)
        .unwrap()
        .part_text("word/header1.xml")
        .unwrap()
        .unwrap();
    assert!(header.contains("P-001 Abbildung 1"));
}

#[test]
fn loop_and_set_bindings_are_not_required() {
    let xml = "{{ a }}{% for x, y in pairs %}{{ x }}{{ y }}{{ loop.index }}{% endfor %}\
               {% set total = 1 %}{{ total }}{{- b | upper }}{{ \"literal\" }}";
    let names: Vec<String> = required_placeholders(xml).into_iter().collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn tag_contents_are_normalised() {
    let xml = "<w:t>{% if score &lt; 3 %}</w:t><w:t>{{ name | default(value=\u{201C}x\u{201D}) }}</w:t>";
    let normalized = normalize_tags(xml);
    assert!(normalized.contains("{% if score < 3 %}"));
    assert!(normalized.contains("{{ name | default(value=\"x\") }}"));

    // Text outside tags is left alone.
    assert_eq!(normalize_tags("a &lt; b"), "a &lt; b");
}

/// Rewrites the uncompressed size recorded in the central directory entry
/// for `name`.
fn patch_declared_size(bytes: &mut [u8], name: &str, size: u32) {
    let signature = [b'P', b'K', 1, 2];
    let mut at = 0;
    while at + 46 <= bytes.len() {
        if bytes[at..at + 4] == signature {
            let name_len = u16::from_le_bytes([bytes[at + 28], bytes[at + 29]]) as usize;
            let end = at + 46 + name_len;
            if end <= bytes.len() && &bytes[at + 46..end] == name.as_bytes() {
                bytes[at + 24..at + 28].copy_from_slice(&size.to_le_bytes());
                return;
            }
        }
        at += 1;
    }
    panic!("{name} not in central directory");
}

#[test]
fn declared_part_size_is_not_trusted() {
    let mut bytes = template_bytes(&[&["Hallo {{ name }}"]]);
    patch_declared_size(&mut bytes, DOCUMENT_PART, 0xFFFF_FFF0);

    match DocxPackage::from_bytes(&bytes) {
        Ok(package) => {
            let xml = package.part_text(DOCUMENT_PART).unwrap().unwrap();
            assert!(xml.contains("Hallo"));
        }
        Err(e) => assert!(matches!(e, ExportError::Package(_)), "{e:?}"),
    }
}
