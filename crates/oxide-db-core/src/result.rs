//! Operation results and the `Resultable` chain.
//!
//! Every long-lived object that talks to a backend (a [`Connection`], a
//! [`PreparedStatement`]) keeps a [`DbResult`] describing its last operation.
//! Layers that catch a failure add context with [`DbResult::prepend_message`]
//! instead of replacing the message, so the top-level caller sees the whole
//! chain together with the most specific server diagnostics.
//!
//! [`Connection`]: crate::connection::Connection
//! [`PreparedStatement`]: crate::prepared::PreparedStatement

use crate::error::Error;

/// No error.
pub const ERR_NONE: u32 = 0;
/// An object name was required but not given.
pub const ERR_NO_NAME_SPECIFIED: u32 = 9;
/// A name is not a valid identifier.
pub const ERR_INVALID_IDENTIFIER: u32 = 11;
/// Connection data does not fit the driver.
pub const ERR_INVALID_DRIVER_TYPE: u32 = 12;
/// The connection is not open.
pub const ERR_NO_CONNECTION: u32 = 20;
/// Opening the connection failed.
pub const ERR_CONNECTION_FAILED: u32 = 21;
/// A table or field does not exist.
pub const ERR_OBJECT_NOT_FOUND: u32 = 30;
/// A table or field already exists.
pub const ERR_OBJECT_EXISTS: u32 = 31;
/// SQL text could not be parsed.
pub const ERR_SQL_PARSE_ERROR: u32 = 40;
/// The backend failed to execute SQL.
pub const ERR_SQL_EXECUTION_ERROR: u32 = 41;
/// Statement text could not be generated.
pub const ERR_STATEMENT_GENERATION: u32 = 42;
/// A transaction is already active.
pub const ERR_TRANSACTION_ACTIVE: u32 = 50;
/// Committing or rolling back a transaction failed.
pub const ERR_ROLLBACK_OR_COMMIT_TRANSACTION: u32 = 51;
/// Generic error.
pub const ERR_OTHER: u32 = 0xffff;

const UNSPECIFIED_ERROR: &str = "Unspecified error encountered";

/// A server result code and name pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerResult {
    /// Backend-specific code.
    pub code: i64,
    /// Backend-specific symbolic name.
    pub name: String,
}

/// Success or failure state of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbResult {
    code: u32,
    message: String,
    message_title: String,
    server: ServerResult,
    server_message: String,
    previous_server: ServerResult,
    previous_server2: ServerResult,
    sql: String,
    error_sql: String,
}

impl DbResult {
    /// Creates a result with `code` and `message`.
    #[must_use]
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.init(code, message);
        result
    }

    /// Creates a successful result.
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Sets the code and message, keeping the server result history.
    ///
    /// The current SQL becomes the error SQL. A success drops the message;
    /// `ERR_OTHER` without a message gets a generic fallback.
    pub fn init(&mut self, code: u32, message: impl Into<String>) {
        self.shift_server_history();
        self.error_sql.clone_from(&self.sql);
        self.code = code;
        self.message = if code == ERR_NONE {
            String::new()
        } else {
            let message = message.into();
            if code == ERR_OTHER && message.is_empty() {
                String::from(UNSPECIFIED_ERROR)
            } else {
                message
            }
        };
    }

    /// Resets to success, clearing messages, server diagnostics and SQL.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Result code, `ERR_NONE` on success.
    #[must_use]
    pub const fn code(&self) -> u32 {
        self.code
    }

    /// Returns true if the code is not `ERR_NONE`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code != ERR_NONE
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Title for the message, if any.
    #[must_use]
    pub fn message_title(&self) -> &str {
        &self.message_title
    }

    /// Sets the message title.
    pub fn set_message_title(&mut self, title: impl Into<String>) {
        self.message_title = title.into();
    }

    /// Adds context to the result.
    ///
    /// A successful result adopts `code` (or `ERR_OTHER` when `code` is
    /// `ERR_NONE`) and becomes an error. `text` is put before any existing
    /// message, separated by a space.
    pub fn prepend_message(&mut self, code: u32, text: &str) {
        if self.code == ERR_NONE {
            self.code = if code == ERR_NONE { ERR_OTHER } else { code };
            self.error_sql.clone_from(&self.sql);
        }
        if !text.is_empty() {
            self.message = if self.message.is_empty() {
                text.to_string()
            } else {
                format!("{text} {}", self.message)
            };
        }
        if self.message.is_empty() && self.code == ERR_OTHER {
            self.message = String::from(UNSPECIFIED_ERROR);
        }
    }

    /// Records the backend's own diagnostics.
    pub fn set_server_result(&mut self, code: i64, name: impl Into<String>, message: impl Into<String>) {
        self.shift_server_history();
        self.server = ServerResult {
            code,
            name: name.into(),
        };
        self.server_message = message.into();
    }

    fn shift_server_history(&mut self) {
        if self.server == ServerResult::default() {
            return;
        }
        self.previous_server2 = core::mem::take(&mut self.previous_server);
        self.previous_server = self.server.clone();
    }

    /// Current server result.
    #[must_use]
    pub const fn server_result(&self) -> &ServerResult {
        &self.server
    }

    /// Server message.
    #[must_use]
    pub fn server_message(&self) -> &str {
        &self.server_message
    }

    /// The server result before the current one.
    #[must_use]
    pub const fn previous_server_result(&self) -> &ServerResult {
        &self.previous_server
    }

    /// The server result two steps back.
    #[must_use]
    pub const fn previous_server_result2(&self) -> &ServerResult {
        &self.previous_server2
    }

    /// Records `err`: its code and message, and the server diagnostics of a
    /// backend error. The current SQL becomes the error SQL.
    pub fn set_error(&mut self, err: &Error) {
        self.init(err.code(), err.to_string());
        // `init` already moved the previous pair into the history.
        if let Error::Backend(backend) = err {
            self.server = ServerResult {
                code: backend.code,
                name: backend.name.clone(),
            };
            self.server_message.clone_from(&backend.message);
        }
    }

    /// Most recently executed SQL.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Records the SQL about to be executed.
    pub fn set_sql(&mut self, sql: impl Into<String>) {
        self.sql = sql.into();
    }

    /// SQL in effect when the error was recorded.
    #[must_use]
    pub fn error_sql(&self) -> &str {
        &self.error_sql
    }
}

impl From<&Error> for DbResult {
    fn from(err: &Error) -> Self {
        let mut result = Self::default();
        result.set_error(err);
        result
    }
}

/// An object that exposes the result of its last operation.
pub trait Resultable {
    /// Result of the last operation.
    fn result(&self) -> &DbResult;

    /// Mutable access to the result.
    fn result_mut(&mut self) -> &mut DbResult;

    /// Resets the result to success.
    fn clear_result(&mut self) {
        self.result_mut().clear();
    }
}
