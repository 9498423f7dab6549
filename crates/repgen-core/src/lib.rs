//! repgen-core
//!
//! Pure domain types and file naming conventions.
//! No database, spreadsheet or document dependency. This is the shared
//! vocabulary of the report pipeline.

pub mod error;
pub mod models;
pub mod naming;
