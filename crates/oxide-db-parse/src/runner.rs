//! Parsing batches and reporting each statement.

use tracing::{debug, warn};

use oxide_db_core::driver::{Driver, GenericDriver};
use oxide_db_core::generator::StatementBuilder;
use oxide_db_core::schema::SchemaSource;
use oxide_db_core::{Error, Parser};
use oxide_db_sqlite::SqliteDriver;

use crate::batch::{split_statements, BatchStatement};
use crate::error::{HarnessError, Result};

/// Returns the built-in driver with id `id`.
///
/// # Errors
///
/// Returns `HarnessError::UnknownDriver` for any other id.
pub fn driver_by_id(id: &str) -> Result<Box<dyn Driver>> {
    match id.to_ascii_lowercase().as_str() {
        "generic" => Ok(Box::new(GenericDriver::new())),
        "sqlite" => Ok(Box::new(SqliteDriver::new())),
        _ => Err(HarnessError::UnknownDriver(id.to_string())),
    }
}

/// What happened to one statement of a batch.
#[derive(Debug)]
pub struct Outcome {
    /// The statement as found in the batch.
    pub statement: BatchStatement,
    /// Regenerated SQL, or the parse or generation error.
    pub result: core::result::Result<String, Error>,
}

impl Outcome {
    /// Returns true if the statement parsed and regenerated.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Report text: the regenerated SQL terminated by `;`, or an error line
    /// followed by the statement and a caret under the error position.
    #[must_use]
    pub fn report(&self) -> String {
        match &self.result {
            Ok(sql) => format!("{sql};"),
            Err(Error::Parse(err)) => {
                let position = err.position().min(self.statement.text.len());
                let column = self.statement.text[..position].chars().count();
                format!(
                    "error (line {}, position {}): {}\n  {}\n  {}^",
                    self.statement.line,
                    position,
                    err.message,
                    self.statement.text,
                    " ".repeat(column)
                )
            }
            Err(err) => format!("error (line {}): {err}", self.statement.line),
        }
    }
}

/// Parses every statement of `input` against `source` and regenerates it
/// with `driver`. Failures do not stop the batch.
pub fn run_batch(source: &dyn SchemaSource, driver: &dyn Driver, input: &str) -> Vec<Outcome> {
    let parser = Parser::new(source);
    let builder = StatementBuilder::new(driver);
    split_statements(input)
        .into_iter()
        .map(|statement| {
            let result = parser
                .parse(&statement.text)
                .map_err(Error::from)
                .and_then(|query| builder.select_statement(&query).map_err(Error::from));
            match &result {
                Ok(sql) => debug!(line = statement.line, sql = %sql, "Parsed statement"),
                Err(err) => warn!(line = statement.line, error = %err, "Statement failed"),
            }
            Outcome { statement, result }
        })
        .collect()
}
