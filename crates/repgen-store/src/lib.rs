//! repgen-store
//!
//! Patient lookup against the local SQLite database. Thin wrapper around
//! rusqlite.

pub mod db;
pub mod error;
pub mod patients;

pub use crate::error::StoreError;
pub use crate::patients::PatientStore;
