//! A `.docx` file as an ordered list of zip parts.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{ExportError, io_err};

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An opened Word package. Part order is kept so that writing it back out
/// is stable.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<Part>,
}

impl DocxPackage {
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        if !path.is_file() {
            return Err(ExportError::TemplateNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(io_err(path))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| ExportError::Package(format!("{}: {e}", file.name())))?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        let package = Self { parts };
        if package.part(DOCUMENT_PART).is_none() {
            return Err(ExportError::Package(format!("missing {DOCUMENT_PART}")));
        }
        Ok(package)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// A part decoded as UTF-8 text.
    pub fn part_text(&self, name: &str) -> Result<Option<String>, ExportError> {
        self.part(name)
            .map(|data| {
                String::from_utf8(data.to_vec())
                    .map_err(|_| ExportError::Package(format!("{name} is not UTF-8")))
            })
            .transpose()
    }

    /// Replace a part, or append it when the package does not have it yet.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Header and footer parts, in package order.
    pub fn header_footer_parts(&self) -> Vec<String> {
        self.part_names()
            .filter(|name| is_header_or_footer(name))
            .map(str::to_string)
            .collect()
    }

    /// Serialize the package. Timestamps are fixed so equal input gives
    /// equal bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            writer
                .write_all(&part.data)
                .map_err(|e| ExportError::Package(format!("{}: {e}", part.name)))?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}
