//! Connections, connection data and transactions.
//!
//! A [`Connection`] pairs a [`Driver`] with a [`Backend`]. The driver knows
//! the SQL dialect; the backend talks to the native client. Every failure is
//! returned as an [`Error`] and mirrored into the connection's [`DbResult`]
//! with some context prepended.

use core::cell::RefCell;
use core::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::driver::{Driver, DriverInfo};
use crate::error::{BackendError, Error, GenerationError};
use crate::generator::StatementBuilder;
use crate::parser::Parser;
use crate::prepared::{
    ExecutionSummary, FieldSource, PreparedStatement, PreparedStatementInterface,
    PreparedStatementKind,
};
use crate::result::{DbResult, Resultable};
use crate::schema::{Catalog, QuerySchema, SchemaSource, TableSchema};

const DEFAULT_HOST: &str = "localhost";

/// Parameters for opening a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionData {
    /// Id of the driver to use, empty for any.
    pub driver_id: String,
    /// User-visible name of the connection.
    pub caption: String,
    /// Longer description.
    pub description: String,
    /// Server host; empty means localhost.
    pub host_name: String,
    /// Server port; 0 means the driver's default.
    pub port: u16,
    /// Prefer a local socket file over TCP for local servers.
    pub use_local_socket_file: bool,
    /// Socket file path; empty means the driver's default.
    pub local_socket_file_name: String,
    /// User name.
    pub user_name: String,
    /// Password, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Whether the password should be stored with the data.
    pub save_password: bool,
    /// Database name, or file path for file-based drivers.
    pub database_name: String,
}

impl Default for ConnectionData {
    fn default() -> Self {
        Self {
            driver_id: String::new(),
            caption: String::new(),
            description: String::new(),
            host_name: String::new(),
            port: 0,
            use_local_socket_file: true,
            local_socket_file_name: String::new(),
            user_name: String::new(),
            password: None,
            save_password: false,
            database_name: String::new(),
        }
    }
}

/// Options for [`ConnectionData::to_user_visible_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserVisibleStringOptions {
    /// Include `user@` for server connections.
    pub add_user: bool,
}

impl Default for UserVisibleStringOptions {
    fn default() -> Self {
        Self { add_user: true }
    }
}

impl ConnectionData {
    /// Connection data for a file-based driver.
    #[must_use]
    pub fn file(driver_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            driver_id: driver_id.into(),
            database_name: path.into(),
            ..Self::default()
        }
    }

    /// Short description such as `file: cars.db` or `joe@db.example.com:5432`,
    /// prefixed by the caption when there is one. Passwords never appear.
    #[must_use]
    pub fn to_user_visible_string(
        &self,
        driver: &DriverInfo,
        options: UserVisibleStringOptions,
    ) -> String {
        let location = if driver.file_based {
            format!("file: {}", self.database_name)
        } else {
            let mut location = String::new();
            if options.add_user && !self.user_name.is_empty() {
                location.push_str(&self.user_name);
                location.push('@');
            }
            location.push_str(if self.host_name.is_empty() {
                DEFAULT_HOST
            } else {
                &self.host_name
            });
            if self.port != 0 {
                location.push_str(&format!(":{}", self.port));
            }
            location
        };
        if self.caption.is_empty() {
            location
        } else {
            format!("{} ({location})", self.caption)
        }
    }
}

/// The native side of a connection.
///
/// Implementations wrap a client library. They are driven by [`Connection`]
/// and never see the parser or the generator.
pub trait Backend {
    /// Opens the connection described by `data`.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn connect(&mut self, data: &ConnectionData) -> Result<(), BackendError>;

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn disconnect(&mut self) -> Result<(), BackendError>;

    /// Names of the tables in the database.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn table_names(&mut self) -> Result<Vec<String>, BackendError>;

    /// Reads the schema of table `name`, `None` if there is no such table.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn load_table_schema(&mut self, name: &str) -> Result<Option<TableSchema>, BackendError>;

    /// Executes a statement without parameters.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn execute_sql(&mut self, sql: &str) -> Result<ExecutionSummary, BackendError>;

    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn begin_transaction(&mut self) -> Result<(), BackendError>;

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn commit_transaction(&mut self) -> Result<(), BackendError>;

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn rollback_transaction(&mut self) -> Result<(), BackendError>;

    /// Creates the backend side of a prepared statement.
    ///
    /// # Errors
    ///
    /// Returns the server's diagnostics on failure.
    fn prepared_statement_interface(
        &mut self,
    ) -> Result<Box<dyn PreparedStatementInterface>, BackendError>;
}

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct TransactionData {
    connection_id: u64,
    active: AtomicBool,
}

/// A transaction handle.
///
/// Clones share the transaction. It stays bound to the connection that began
/// it and becomes inactive once committed or rolled back.
#[derive(Debug, Clone)]
pub struct Transaction(Arc<TransactionData>);

impl Transaction {
    fn new(connection_id: u64) -> Self {
        Self(Arc::new(TransactionData {
            connection_id,
            active: AtomicBool::new(true),
        }))
    }

    /// Id of the connection that began the transaction.
    #[must_use]
    pub fn connection_id(&self) -> u64 {
        self.0.connection_id
    }

    /// Returns true until the transaction is committed or rolled back.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.0.active.load(Ordering::Acquire)
    }

    fn set_active(&self, active: bool) {
        self.0.active.store(active, Ordering::Release);
    }

    /// Number of live handles to this transaction.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Transaction {}

/// An open or closed database connection.
pub struct Connection {
    id: u64,
    driver: Arc<dyn Driver>,
    data: ConnectionData,
    backend: RefCell<Box<dyn Backend>>,
    catalog: RefCell<Catalog>,
    connected: bool,
    transaction: Option<Transaction>,
    result: DbResult,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("driver", &self.driver.info().id)
            .field("data", &self.data)
            .field("connected", &self.connected)
            .field("transaction", &self.transaction)
            .finish_non_exhaustive()
    }
}

enum TransactionEnd {
    Commit,
    Rollback,
}

impl Connection {
    /// Creates a closed connection.
    ///
    /// # Errors
    ///
    /// Returns `Error::DriverMismatch` if `data` names another driver.
    pub fn new(
        driver: Arc<dyn Driver>,
        data: ConnectionData,
        backend: Box<dyn Backend>,
    ) -> Result<Self, Error> {
        driver.validate_connection_data(&data)?;
        Ok(Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            driver,
            data,
            backend: RefCell::new(backend),
            catalog: RefCell::new(Catalog::new()),
            connected: false,
            transaction: None,
            result: DbResult::ok(),
        })
    }

    /// Unique id of this connection.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The driver.
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// The connection data.
    #[must_use]
    pub const fn data(&self) -> &ConnectionData {
        &self.data
    }

    /// Returns true between a successful `connect` and `disconnect`.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// The transaction begun by [`begin_transaction`](Self::begin_transaction),
    /// while it is active.
    #[must_use]
    pub const fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    fn record(&mut self, err: Error, context: &str) -> Error {
        warn!(connection = self.id, error = %err, "{context}");
        self.result.set_error(&err);
        self.result.prepend_message(err.code(), context);
        err
    }

    fn require_connection(&mut self) -> Result<(), Error> {
        if self.connected {
            Ok(())
        } else {
            Err(self.record(Error::NotConnected, "Not connected to the database."))
        }
    }

    /// Opens the connection. Connecting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend cannot connect.
    pub fn connect(&mut self) -> Result<(), Error> {
        self.result.clear();
        if self.connected {
            return Ok(());
        }
        let visible = self
            .data
            .to_user_visible_string(self.driver.info(), UserVisibleStringOptions::default());
        if let Err(err) = self.backend.get_mut().connect(&self.data) {
            let context = format!("Could not connect to \"{visible}\".");
            return Err(self.record(Error::from(err), &context));
        }
        self.connected = true;
        info!(connection = self.id, target_db = %visible, "Connected");
        Ok(())
    }

    /// Closes the connection, rolling back an active transaction first. Cached
    /// table schemas are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend cannot disconnect.
    pub fn disconnect(&mut self) -> Result<(), Error> {
        self.result.clear();
        if !self.connected {
            return Ok(());
        }
        if let Some(transaction) = self.transaction.clone() {
            self.rollback_transaction(&transaction)?;
        }
        if let Err(err) = self.backend.get_mut().disconnect() {
            return Err(self.record(Error::from(err), "Could not disconnect."));
        }
        self.connected = false;
        self.catalog.get_mut().clear();
        debug!(connection = self.id, "Disconnected");
        Ok(())
    }

    /// Names of the tables in the database.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` or `Error::Backend`.
    pub fn table_names(&mut self) -> Result<Vec<String>, Error> {
        self.result.clear();
        self.require_connection()?;
        self.backend
            .get_mut()
            .table_names()
            .map_err(|err| self.record(Error::from(err), "Could not retrieve table names."))
    }

    /// Schema of table `name`, loaded from the backend once and then cached.
    ///
    /// Returns `None` if there is no such table, the connection is closed or
    /// the backend fails.
    #[must_use]
    pub fn table_schema(&self, name: &str) -> Option<Arc<TableSchema>> {
        if let Some(table) = self.catalog.borrow().table(name) {
            return Some(Arc::clone(table));
        }
        if !self.connected {
            return None;
        }
        let loaded = match self.backend.borrow_mut().load_table_schema(name) {
            Ok(loaded) => loaded?,
            Err(err) => {
                warn!(connection = self.id, table = name, error = %err, "Could not load table schema");
                return None;
            }
        };
        debug!(connection = self.id, table = name, "Loaded table schema");
        let table = Arc::new(loaded);
        self.catalog.borrow_mut().insert(Arc::clone(&table));
        Some(table)
    }

    /// Parses a `SELECT` statement against this connection's tables.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` on syntax or name resolution errors.
    pub fn parse(&mut self, sql: &str) -> Result<QuerySchema, Error> {
        self.result.clear();
        self.result.set_sql(sql);
        let parsed = Parser::new(&*self).parse(sql);
        parsed.map_err(|err| self.record(Error::from(err), "Could not parse SQL statement."))
    }

    /// Generates `SELECT` text for `query` in this connection's dialect.
    ///
    /// # Errors
    ///
    /// Returns a `GenerationError` for an empty query.
    pub fn select_statement(&self, query: &QuerySchema) -> Result<String, GenerationError> {
        StatementBuilder::new(self.driver.as_ref()).select_statement(query)
    }

    /// Executes `sql` without parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` or `Error::Backend`. The SQL and the
    /// server's diagnostics are kept in [`result`](Resultable::result).
    pub fn execute_sql(&mut self, sql: &str) -> Result<ExecutionSummary, Error> {
        self.result.clear();
        self.require_connection()?;
        self.result.set_sql(sql);
        debug!(connection = self.id, sql, "Executing SQL");
        self.backend
            .get_mut()
            .execute_sql(sql)
            .map_err(|err| self.record(Error::from(err), "Error while executing SQL statement."))
    }

    /// Creates a prepared statement over `source`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotConnected` or `Error::Backend`.
    pub fn prepare_statement(
        &mut self,
        kind: PreparedStatementKind,
        source: FieldSource,
    ) -> Result<PreparedStatement, Error> {
        self.result.clear();
        self.require_connection()?;
        let interface = self
            .backend
            .get_mut()
            .prepared_statement_interface()
            .map_err(|err| self.record(Error::from(err), "Could not create prepared statement."))?;
        Ok(PreparedStatement::new(
            Arc::clone(&self.driver),
            interface,
            kind,
            source,
        ))
    }

    /// Begins a transaction.
    ///
    /// Drivers that ignore transactions get an active handle without any
    /// backend call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transaction` if the driver has no transactions or one
    /// is already active and the driver allows only one; `Error::NotConnected`
    /// or `Error::Backend` otherwise.
    pub fn begin_transaction(&mut self) -> Result<Transaction, Error> {
        self.result.clear();
        self.require_connection()?;
        let features = self.driver.info().features;
        if !features.supports_transactions() && !features.ignore_transactions {
            let err = Error::Transaction(format!(
                "Transactions are not supported by the {} driver",
                self.driver.info().name
            ));
            return Err(self.record(err, "Could not begin transaction."));
        }
        if self.transaction.is_some()
            && !features.multiple_transactions
            && !features.nested_transactions
        {
            let err = Error::Transaction(String::from("A transaction is already active"));
            return Err(self.record(err, "Could not begin transaction."));
        }
        if !features.ignore_transactions {
            if let Err(err) = self.backend.get_mut().begin_transaction() {
                return Err(self.record(Error::from(err), "Could not begin transaction."));
            }
        }
        let transaction = Transaction::new(self.id);
        if self.transaction.is_none() {
            self.transaction = Some(transaction.clone());
        }
        debug!(connection = self.id, "Transaction started");
        Ok(transaction)
    }

    /// Commits `transaction`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transaction` if the transaction belongs to another
    /// connection or is no longer active; `Error::Backend` if the backend
    /// fails.
    pub fn commit_transaction(&mut self, transaction: &Transaction) -> Result<(), Error> {
        self.end_transaction(transaction, TransactionEnd::Commit)
    }

    /// Rolls back `transaction`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transaction` if the transaction belongs to another
    /// connection or is no longer active; `Error::Backend` if the backend
    /// fails.
    pub fn rollback_transaction(&mut self, transaction: &Transaction) -> Result<(), Error> {
        self.end_transaction(transaction, TransactionEnd::Rollback)
    }

    fn end_transaction(
        &mut self,
        transaction: &Transaction,
        end: TransactionEnd,
    ) -> Result<(), Error> {
        self.result.clear();
        let context = match end {
            TransactionEnd::Commit => "Could not commit transaction.",
            TransactionEnd::Rollback => "Could not roll back transaction.",
        };
        if transaction.connection_id() != self.id {
            let err = Error::Transaction(String::from(
                "The transaction belongs to another connection",
            ));
            return Err(self.record(err, context));
        }
        if !transaction.is_active() {
            let err = Error::Transaction(String::from("The transaction is not active"));
            return Err(self.record(err, context));
        }
        self.require_connection()?;
        if !self.driver.info().features.ignore_transactions {
            let outcome = match end {
                TransactionEnd::Commit => self.backend.get_mut().commit_transaction(),
                TransactionEnd::Rollback => self.backend.get_mut().rollback_transaction(),
            };
            if let Err(err) = outcome {
                return Err(self.record(Error::from(err), context));
            }
        }
        transaction.set_active(false);
        if self.transaction.as_ref() == Some(transaction) {
            self.transaction = None;
        }
        debug!(
            connection = self.id,
            committed = matches!(end, TransactionEnd::Commit),
            "Transaction finished"
        );
        Ok(())
    }
}

impl SchemaSource for Connection {
    fn table_schema(&self, name: &str) -> Option<Arc<TableSchema>> {
        Self::table_schema(self, name)
    }
}

impl Resultable for Connection {
    fn result(&self) -> &DbResult {
        &self.result
    }

    fn result_mut(&mut self) -> &mut DbResult {
        &mut self.result
    }
}
