//! # oxide-db-sqlite
//!
//! SQLite driver descriptor for `oxide-db-core`.
//!
//! The driver describes the dialect only. Opening database files is the job of
//! a [`Backend`](oxide_db_core::Backend) implementation wrapping a client
//! library.
//!
//! # How SQLite differs from the generic driver
//!
//! - **[Keywords]**: words such as `PRAGMA`, `VACUUM` and `WITHOUT` are
//!   reserved and get quoted when used as identifiers.
//! - **[Type affinity]**: columns are declared as `INTEGER`, `REAL`, `TEXT`
//!   or `BLOB`. Dates and times are stored as text.
//! - **Booleans** are stored as `1` and `0`.
//! - **Transactions**: one at a time, no nesting.
//! - **[AUTOINCREMENT]** on an integer primary key.
//!
//! [Keywords]: https://www.sqlite.org/lang_keywords.html
//! [Type affinity]: https://www.sqlite.org/datatype3.html
//! [AUTOINCREMENT]: https://www.sqlite.org/autoinc.html
//!
//! ## Example
//!
//! ```rust
//! use oxide_db_core::generator::StatementBuilder;
//! use oxide_db_core::schema::{Catalog, Field, FieldType, TableSchema};
//! use oxide_db_core::Parser;
//! use oxide_db_sqlite::SqliteDriver;
//!
//! let table = TableSchema::new("settings")
//!     .unwrap()
//!     .with_field(Field::new("pragma", FieldType::Text))
//!     .unwrap();
//! let mut catalog = Catalog::new();
//! catalog.add_table(table).unwrap();
//!
//! let query = Parser::new(&catalog).parse("SELECT pragma FROM settings").unwrap();
//! let sql = StatementBuilder::new(&SqliteDriver::new())
//!     .select_statement(&query)
//!     .unwrap();
//! assert_eq!(sql, "SELECT \"pragma\" FROM settings");
//! ```

mod driver;
mod keywords;

pub use driver::SqliteDriver;
pub use keywords::SQLITE_KEYWORDS;
