//! Batch parser harness for `oxide-db`.
//!
//! Reads `;`-terminated `SELECT` statements, parses each one against a JSON
//! schema fixture and prints the regenerated SQL, or the error with its
//! position. A failing statement does not stop the batch.
//!
//! # CLI Usage
//!
//! ```bash
//! # Parse a batch file against a schema
//! oxide-db-parse --schema cars.json parse queries.sql
//!
//! # Read statements from stdin, render them for SQLite
//! echo "SELECT * FROM cars;" | oxide-db-parse --schema cars.json --driver sqlite parse
//!
//! # List the reserved words of a driver
//! oxide-db-parse --driver sqlite keywords
//! ```

pub mod batch;
pub mod error;
pub mod runner;
pub mod schema_file;

pub use batch::{split_statements, BatchStatement};
pub use error::{HarnessError, Result};
pub use runner::{driver_by_id, run_batch, Outcome};
pub use schema_file::SchemaFile;
