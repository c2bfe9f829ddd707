#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use oxide_db_core::connection::{Backend, Connection, ConnectionData};
use oxide_db_core::driver::GenericDriver;
use oxide_db_core::error::BackendError;
use oxide_db_core::generator::StatementBuilder;
use oxide_db_core::prepared::{ExecutionSummary, PreparedStatementInterface, PreparedStatementKind};
use oxide_db_core::schema::{Catalog, ExpandMode, Field, FieldType, QuerySchema, TableSchema};
use oxide_db_core::{ParseError, Parser, Value};

/// `cars(id, owner, model, year)`.
pub fn cars_table() -> TableSchema {
    TableSchema::new("cars")
        .unwrap()
        .with_field(Field::new("id", FieldType::Integer).primary_key().auto_increment())
        .unwrap()
        .with_field(Field::new("owner", FieldType::Integer))
        .unwrap()
        .with_field(Field::new("model", FieldType::Text).max_length(40))
        .unwrap()
        .with_field(Field::new("year", FieldType::ShortInteger))
        .unwrap()
}

/// `persons(id, name, surname)`.
pub fn persons_table() -> TableSchema {
    TableSchema::new("persons")
        .unwrap()
        .with_field(Field::new("id", FieldType::Integer).primary_key())
        .unwrap()
        .with_field(Field::new("name", FieldType::Text))
        .unwrap()
        .with_field(Field::new("surname", FieldType::Text))
        .unwrap()
}

pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_table(cars_table()).unwrap();
    catalog.add_table(persons_table()).unwrap();
    catalog
}

pub fn parse_with(catalog: &Catalog, sql: &str) -> QuerySchema {
    Parser::new(catalog)
        .parse(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse(sql: &str) -> QuerySchema {
    parse_with(&catalog(), sql)
}

pub fn parse_err(sql: &str) -> ParseError {
    match Parser::new(&catalog()).parse(sql) {
        Ok(query) => panic!("Expected parse error for: {sql}, got {query:?}"),
        Err(err) => err,
    }
}

pub fn generate(query: &QuerySchema) -> String {
    StatementBuilder::new(&GenericDriver::new())
        .select_statement(query)
        .unwrap_or_else(|e| panic!("Failed to generate: {e:?}"))
}

pub fn column_names(query: &QuerySchema) -> Vec<String> {
    query
        .fields_expanded(ExpandMode::All)
        .iter()
        .map(|column| column.name())
        .collect()
}

/// Verifies that generating, parsing and generating again is a fixed point
/// selecting the same columns.
pub fn round_trip(sql: &str) {
    let catalog = catalog();
    let first = parse_with(&catalog, sql);
    let rendered1 = generate(&first);
    let second = parse_with(&catalog, &rendered1);
    let rendered2 = generate(&second);
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
    assert_eq!(column_names(&first), column_names(&second));
}

/// Everything the mock backend was asked to do.
#[derive(Debug, Default)]
pub struct BackendLog {
    pub connected: bool,
    pub executed: Vec<String>,
    pub prepared: Vec<String>,
    pub transactions: Vec<&'static str>,
    pub schema_loads: usize,
    pub inserted: u64,
}

/// In-memory backend over a catalog. SQL containing `fail` is rejected.
pub struct MockBackend {
    log: Rc<RefCell<BackendLog>>,
    tables: Catalog,
}

impl MockBackend {
    fn check_connected(&self) -> Result<(), BackendError> {
        if self.log.borrow().connected {
            Ok(())
        } else {
            Err(BackendError::new(21, "MISUSE", "not connected"))
        }
    }
}

impl Backend for MockBackend {
    fn connect(&mut self, data: &ConnectionData) -> Result<(), BackendError> {
        if data.database_name == "missing.db" {
            return Err(BackendError::new(14, "CANTOPEN", "unable to open database file"));
        }
        self.log.borrow_mut().connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().connected = false;
        Ok(())
    }

    fn table_names(&mut self) -> Result<Vec<String>, BackendError> {
        self.check_connected()?;
        Ok(self.tables.table_names())
    }

    fn load_table_schema(&mut self, name: &str) -> Result<Option<TableSchema>, BackendError> {
        self.check_connected()?;
        self.log.borrow_mut().schema_loads += 1;
        Ok(self.tables.table(name).map(|table| TableSchema::clone(table)))
    }

    fn execute_sql(&mut self, sql: &str) -> Result<ExecutionSummary, BackendError> {
        self.check_connected()?;
        if sql.contains("fail") {
            return Err(BackendError::new(1, "ERROR", "no such table: fail"));
        }
        self.log.borrow_mut().executed.push(sql.to_string());
        Ok(ExecutionSummary {
            rows_affected: 1,
            last_insert_record_id: None,
        })
    }

    fn begin_transaction(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().transactions.push("BEGIN");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().transactions.push("COMMIT");
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<(), BackendError> {
        self.log.borrow_mut().transactions.push("ROLLBACK");
        Ok(())
    }

    fn prepared_statement_interface(
        &mut self,
    ) -> Result<Box<dyn PreparedStatementInterface>, BackendError> {
        self.check_connected()?;
        Ok(Box::new(MockStatement {
            log: Rc::clone(&self.log),
        }))
    }
}

/// Prepared statement side of [`MockBackend`]. Inserts get increasing ids.
pub struct MockStatement {
    log: Rc<RefCell<BackendLog>>,
}

impl PreparedStatementInterface for MockStatement {
    fn prepare(&mut self, sql: &str) -> Result<(), BackendError> {
        if sql.contains("fail") {
            return Err(BackendError::new(1, "ERROR", "cannot prepare"));
        }
        self.log.borrow_mut().prepared.push(sql.to_string());
        Ok(())
    }

    fn execute(
        &mut self,
        kind: PreparedStatementKind,
        parameter_fields: &[Arc<Field>],
        _fields: &[Arc<Field>],
        params: &[Value],
    ) -> Result<ExecutionSummary, BackendError> {
        if parameter_fields.len() != params.len() {
            return Err(BackendError::new(25, "RANGE", "parameter count mismatch"));
        }
        let mut log = self.log.borrow_mut();
        let last_insert_record_id = (kind == PreparedStatementKind::Insert).then(|| {
            log.inserted += 1;
            log.inserted
        });
        Ok(ExecutionSummary {
            rows_affected: 1,
            last_insert_record_id,
        })
    }
}

/// A closed connection over [`MockBackend`] serving [`catalog`].
pub fn mock_connection() -> (Connection, Rc<RefCell<BackendLog>>) {
    mock_connection_with(ConnectionData::file("generic", "cars.db"))
}

pub fn mock_connection_with(data: ConnectionData) -> (Connection, Rc<RefCell<BackendLog>>) {
    let log = Rc::new(RefCell::new(BackendLog::default()));
    let backend = MockBackend {
        log: Rc::clone(&log),
        tables: catalog(),
    };
    let connection = Connection::new(Arc::new(GenericDriver::new()), data, Box::new(backend))
        .unwrap_or_else(|e| panic!("Failed to create connection: {e:?}"));
    (connection, log)
}
