//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing.
//! Parsing runs in two passes: the syntax pass builds an unresolved
//! expression tree, then names are resolved against a [`SchemaSource`] into a
//! [`QuerySchema`]. Errors from either pass carry the byte span of the
//! offending token.

mod error;
mod pratt;
mod resolve;
mod syntax;

pub use error::{ParseError, ParseErrorKind};

use tracing::debug;

use crate::schema::{QuerySchema, SchemaSource};
use resolve::Resolver;
use syntax::SyntaxParser;

/// Parses `SELECT` statements into query schemas.
///
/// ```
/// use oxide_db_core::parser::Parser;
/// use oxide_db_core::schema::{Catalog, Field, FieldType, TableSchema};
///
/// let mut catalog = Catalog::new();
/// let cars = TableSchema::new("cars")
///     .unwrap()
///     .with_field(Field::new("id", FieldType::Integer).primary_key())
///     .unwrap();
/// catalog.add_table(cars).unwrap();
///
/// let query = Parser::new(&catalog).parse("SELECT id FROM cars WHERE id = 1;").unwrap();
/// assert_eq!(query.column_count(), 1);
/// ```
pub struct Parser<'s> {
    source: &'s dyn SchemaSource,
}

impl<'s> Parser<'s> {
    /// Creates a parser resolving names against `source`.
    #[must_use]
    pub fn new(source: &'s dyn SchemaSource) -> Self {
        Self { source }
    }

    /// Parses a single `SELECT` statement.
    ///
    /// # Errors
    ///
    /// Returns a syntax `ParseError` for malformed input and a semantic one
    /// for unknown tables or columns, ambiguous columns, and `*` without
    /// `FROM`.
    pub fn parse(&self, sql: &str) -> Result<QuerySchema, ParseError> {
        let result = SyntaxParser::new(sql)
            .parse_select()
            .and_then(|syntax| Resolver::new(self.source).resolve(&syntax));
        if let Err(err) = &result {
            debug!(
                position = err.position(),
                kind = ?err.kind,
                "Failed to parse SQL: {}",
                err.message
            );
        }
        result
    }
}
