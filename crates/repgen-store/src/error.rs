use repgen_core::models::patient::SearchField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no patient found with {field} '{value}'")]
    PatientNotFound { field: SearchField, value: String },

    #[error("database not found: {path}")]
    DatabaseNotFound { path: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },
}
