use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, Paragraph, Run, RunFonts, Style, StyleType, Table, TableCell, TableRow,
};

use repgen_core::models::template::TemplateKind;

use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Content of a starter template.
#[derive(Debug, Clone, Default)]
pub struct Scaffold {
    /// Text placeholders, listed as `label: {{ name }}` lines.
    pub fields: Vec<String>,
    /// Picture placeholders, one paragraph each.
    pub figures: Vec<String>,
    /// Optional table, first row is the header. Cells are written verbatim.
    pub table: Vec<Vec<String>>,
}

/// Generate a starter `.docx` template for `kind` with docx-rs.
///
/// The result can be rendered as-is and is meant to be edited in Word.
pub fn generate_scaffold(
    kind: TemplateKind,
    scaffold: &Scaffold,
    styles: &DocumentStyles,
) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "heading 1", styles.heading1_size))
        .add_style(heading_style("Heading2", "heading 2", styles.heading2_size));

    docx = docx.add_paragraph(heading_paragraph(
        &format!("{} template", kind.output_label()),
        "Heading1",
        styles,
    ));

    if !scaffold.fields.is_empty() {
        docx = docx.add_paragraph(heading_paragraph("Fields", "Heading2", styles));
        for name in &scaffold.fields {
            docx = docx.add_paragraph(field_paragraph(name, styles));
        }
    }

    if !scaffold.table.is_empty() {
        docx = docx
            .add_paragraph(Paragraph::new())
            .add_table(table(&scaffold.table, styles));
    }

    if !scaffold.figures.is_empty() {
        docx = docx.add_paragraph(heading_paragraph("Figures", "Heading2", styles));
        for name in &scaffold.figures {
            docx = docx.add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .add_run(body_run(&placeholder(name), styles)),
            );
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn placeholder(name: &str) -> String {
    format!("{{{{ {name} }}}}")
}

fn heading_style(style_id: &str, name: &str, size_pt: usize) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2) // OOXML uses half-points
}

fn heading_paragraph(text: &str, style_id: &str, styles: &DocumentStyles) -> Paragraph {
    Paragraph::new().style(style_id).add_run(
        Run::new()
            .add_text(text)
            .fonts(RunFonts::new().ascii(&styles.heading_font)),
    )
}

fn field_paragraph(name: &str, styles: &DocumentStyles) -> Paragraph {
    Paragraph::new()
        .align(AlignmentType::Left)
        .add_run(body_run(&format!("{name}: "), styles).bold())
        .add_run(body_run(&placeholder(name), styles))
}

fn body_run(text: &str, styles: &DocumentStyles) -> Run {
    Run::new()
        .add_text(text)
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font))
}

fn table(rows: &[Vec<String>], styles: &DocumentStyles) -> Table {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells = row
                .iter()
                .map(|text| {
                    let run = body_run(text, styles);
                    let run = if i == 0 { run.bold() } else { run };
                    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();
    Table::new(rows)
}
