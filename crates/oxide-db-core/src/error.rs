//! Error types for the database core.

use thiserror::Error;

use crate::parser::ParseError;
use crate::result::{
    ERR_INVALID_DRIVER_TYPE, ERR_INVALID_IDENTIFIER, ERR_NO_CONNECTION, ERR_OBJECT_EXISTS,
    ERR_OBJECT_NOT_FOUND, ERR_ROLLBACK_OR_COMMIT_TRANSACTION, ERR_SQL_EXECUTION_ERROR,
    ERR_SQL_PARSE_ERROR, ERR_STATEMENT_GENERATION,
};

/// A table, field or asterisk target is missing or conflicts with the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No table with this name.
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    /// The table has no field with this name.
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// A query item refers to a table position the query does not have.
    #[error("Query has no table at position {0}")]
    TablePositionOutOfRange(usize),

    /// A field with the same name is already in the table.
    #[error("Field '{field}' already exists in table '{table}'")]
    DuplicateField {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// A table with the same name is already present.
    #[error("Table '{0}' already exists")]
    DuplicateTable(String),

    /// The name is not usable as an identifier.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

/// Statement text could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The statement has no fields.
    #[error("No fields specified for statement")]
    NoFields,

    /// A WHERE-bound name does not match any field.
    #[error("Field '{0}' used in WHERE clause not found in the field list")]
    WhereFieldNotFound(String),

    /// The fields do not belong to a table.
    #[error("Fields do not belong to any table")]
    NoTable,

    /// The fields belong to different tables.
    #[error("Fields belong to different tables '{first}' and '{second}'")]
    MixedTables {
        /// First owning table.
        first: String,
        /// Conflicting owning table.
        second: String,
    },

    /// The query selects nothing.
    #[error("Query has no columns")]
    EmptyQuery,
}

/// A failure reported by the native backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    /// Server result code.
    pub code: i64,
    /// Server result name, for example `SQLITE_ERROR`.
    pub name: String,
    /// Server message.
    pub message: String,
}

impl BackendError {
    /// Creates a backend error.
    #[must_use]
    pub fn new(code: i64, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the database core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// SQL text could not be parsed or resolved.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Schema lookup or mutation failed.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Statement text could not be generated.
    #[error("Statement generation error: {0}")]
    Generation(#[from] GenerationError),

    /// The backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The connection is not open.
    #[error("Not connected to a database")]
    NotConnected,

    /// The connection data names a different driver.
    #[error("Connection data is for driver '{expected}' but the driver is '{found}'")]
    DriverMismatch {
        /// Driver id stored in the connection data.
        expected: String,
        /// Id of the driver in use.
        found: String,
    },

    /// A transaction operation is not allowed in the current state.
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl Error {
    /// Returns the result code for this error.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Parse(_) => ERR_SQL_PARSE_ERROR,
            Self::Schema(SchemaError::DuplicateField { .. } | SchemaError::DuplicateTable(_)) => {
                ERR_OBJECT_EXISTS
            }
            Self::Schema(SchemaError::InvalidIdentifier(_)) => ERR_INVALID_IDENTIFIER,
            Self::Schema(_) => ERR_OBJECT_NOT_FOUND,
            Self::Generation(_) => ERR_STATEMENT_GENERATION,
            Self::Backend(_) => ERR_SQL_EXECUTION_ERROR,
            Self::NotConnected => ERR_NO_CONNECTION,
            Self::DriverMismatch { .. } => ERR_INVALID_DRIVER_TYPE,
            Self::Transaction(_) => ERR_ROLLBACK_OR_COMMIT_TRANSACTION,
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
