//! repgen-export
//!
//! Word template rendering, template table reading, starter templates, and
//! PDF conversion through external office suites.

pub mod convert;
pub mod docx;
pub mod drawing;
pub mod error;
pub mod package;
pub mod pipeline;
pub mod placeholders;
pub mod render;
pub mod styles;
pub mod tables;
mod xml;

pub use error::ExportError;
pub use pipeline::ExportPipeline;
pub use render::{render_template, render_to_file};
