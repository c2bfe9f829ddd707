//! Error types for the parser harness.

use std::path::PathBuf;

/// Errors that stop a harness run before any statement is parsed.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A file could not be read.
    #[error("Could not read '{path}': {source}")]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The schema file is not valid JSON for a schema.
    #[error("Invalid schema file '{path}': {source}")]
    Json {
        /// Path of the schema file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The schema describes an invalid table or field.
    #[error("Invalid schema: {0}")]
    Schema(#[from] oxide_db_core::Error),

    /// No driver with this id is built in.
    #[error("Unknown driver '{0}', expected 'generic' or 'sqlite'")]
    UnknownDriver(String),
}

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
