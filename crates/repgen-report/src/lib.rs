//! repgen-report
//!
//! Builds the placeholder context for one patient and fills the matching
//! template. Everything here is a plain request/response call; PDF export
//! is left to the caller.

pub mod context;
pub mod distributions;
pub mod error;
pub mod generate;
pub mod scaffold;
pub mod settings;

pub use context::{BuiltContext, ContextBuilder, ContextInput, MissingDataPolicy, MissingItem};
pub use distributions::{DistributionSettings, stage_distributions};
pub use error::ReportError;
pub use generate::{GenerateRequest, GeneratedReport, generate, resolve_template};
pub use scaffold::scaffold_for;
pub use settings::ReportSettings;
