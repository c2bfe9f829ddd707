//! # oxide-db-core
//!
//! Database abstraction core: a SQL `SELECT` parser, a query schema model,
//! an expression tree and driver-aware statement generation.
//!
//! This crate provides:
//! - Identifier validation and escaping
//! - A hand-written recursive descent parser with Pratt expression parsing,
//!   resolving names against a schema source
//! - Table and query schemas with asterisk expansion
//! - SELECT, CREATE TABLE and prepared statement text generation
//! - Driver, backend, connection and transaction contracts with a result
//!   chain mirroring every failure
//!
//! No I/O happens here. Native clients implement
//! [`Backend`](connection::Backend) and
//! [`PreparedStatementInterface`](prepared::PreparedStatementInterface).
//!
//! ## Parsing and generating
//!
//! ```rust
//! use oxide_db_core::driver::GenericDriver;
//! use oxide_db_core::generator::StatementBuilder;
//! use oxide_db_core::parser::Parser;
//! use oxide_db_core::schema::{Catalog, Field, FieldType, TableSchema};
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .add_table(
//!         TableSchema::new("cars")
//!             .unwrap()
//!             .with_field(Field::new("id", FieldType::Integer).primary_key())
//!             .unwrap()
//!             .with_field(Field::new("model", FieldType::Text))
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let query = Parser::new(&catalog)
//!     .parse("SELECT * FROM cars WHERE id > 10 ORDER BY model")
//!     .unwrap();
//! assert_eq!(query.column_count(), 2);
//!
//! let driver = GenericDriver::new();
//! let sql = StatementBuilder::new(&driver).select_statement(&query).unwrap();
//! assert_eq!(sql, "SELECT * FROM cars WHERE id > 10 ORDER BY model");
//! ```
//!
//! ## Identifier escaping
//!
//! ```rust
//! use oxide_db_core::identifier::{escape_identifier_and_add_quotes, string_to_identifier};
//!
//! assert_eq!(string_to_identifier("2 wheels"), "_2_wheels");
//! assert_eq!(escape_identifier_and_add_quotes("a b"), "\"a b\"");
//! ```

pub mod connection;
pub mod driver;
pub mod error;
pub mod expression;
pub mod generator;
pub mod identifier;
pub mod lexer;
pub mod parser;
pub mod prepared;
pub mod result;
pub mod schema;
pub mod value;

pub use connection::{Backend, Connection, ConnectionData, Transaction};
pub use driver::{Driver, DriverFeatures, DriverInfo, GenericDriver};
pub use error::{BackendError, Error, GenerationError, Result, SchemaError};
pub use expression::{ExprToken, Expression, ExpressionClass, ExpressionType};
pub use generator::{IdentifierEscaping, StatementBuilder};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseError, Parser};
pub use prepared::{PreparedStatement, PreparedStatementInterface, PreparedStatementKind};
pub use result::{DbResult, Resultable};
pub use schema::{Catalog, Field, FieldType, QuerySchema, SchemaSource, TableSchema};
pub use value::{ToValue, Value};
