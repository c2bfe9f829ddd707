//! Prepared statements.
//!
//! A [`PreparedStatement`] generates its SQL text from a list of fields and
//! hands it to a backend [`PreparedStatementInterface`]. The text is cached
//! and regenerated only after the kind, fields or WHERE names change.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::driver::Driver;
use crate::error::{BackendError, Error, GenerationError};
use crate::result::{DbResult, Resultable};
use crate::schema::{Field, TableSchema};
use crate::value::Value;

/// Record id reported before any insert, or when the backend reports none.
pub const NO_RECORD_ID: u64 = u64::MAX;

/// Kind of prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreparedStatementKind {
    /// `SELECT fields FROM t WHERE w1=? AND ...`.
    #[default]
    Select,
    /// `INSERT INTO t ... VALUES (?, ...)`.
    Insert,
}

/// The fields a statement works on.
#[derive(Debug, Clone)]
pub enum FieldSource {
    /// Every field of a table.
    Table(Arc<TableSchema>),
    /// An explicit list of fields.
    Fields(Vec<Arc<Field>>),
}

impl FieldSource {
    /// The fields in order.
    #[must_use]
    pub fn fields(&self) -> Vec<Arc<Field>> {
        match self {
            Self::Table(table) => table.fields().to_vec(),
            Self::Fields(fields) => fields.clone(),
        }
    }
}

/// What the backend reports after executing a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionSummary {
    /// Rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Record id of the inserted row, if the backend knows it.
    pub last_insert_record_id: Option<u64>,
}

/// Backend side of a prepared statement.
pub trait PreparedStatementInterface {
    /// Compiles `sql`.
    ///
    /// # Errors
    ///
    /// Returns the backend's diagnostics if `sql` is rejected.
    fn prepare(&mut self, sql: &str) -> Result<(), BackendError>;

    /// Executes the prepared text.
    ///
    /// `parameter_fields` describe `params`: the WHERE fields of a select, or
    /// the inserted fields.
    ///
    /// # Errors
    ///
    /// Returns the backend's diagnostics if execution fails.
    fn execute(
        &mut self,
        kind: PreparedStatementKind,
        parameter_fields: &[Arc<Field>],
        fields: &[Arc<Field>],
        params: &[Value],
    ) -> Result<ExecutionSummary, BackendError>;
}

/// A statement prepared once and executed with different parameters.
pub struct PreparedStatement {
    driver: Arc<dyn Driver>,
    interface: Box<dyn PreparedStatementInterface>,
    kind: PreparedStatementKind,
    source: FieldSource,
    where_field_names: Vec<String>,
    dirty: bool,
    sql: Option<String>,
    last_insert_record_id: u64,
    result: DbResult,
}

impl core::fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("driver", &self.driver.info().id)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("where_field_names", &self.where_field_names)
            .field("dirty", &self.dirty)
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

impl PreparedStatement {
    /// Creates a statement. Nothing is generated until the first execution.
    #[must_use]
    pub fn new(
        driver: Arc<dyn Driver>,
        interface: Box<dyn PreparedStatementInterface>,
        kind: PreparedStatementKind,
        source: FieldSource,
    ) -> Self {
        Self {
            driver,
            interface,
            kind,
            source,
            where_field_names: Vec::new(),
            dirty: true,
            sql: None,
            last_insert_record_id: NO_RECORD_ID,
            result: DbResult::ok(),
        }
    }

    /// Sets the WHERE field names, builder style.
    #[must_use]
    pub fn with_where_field_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_where_field_names(names);
        self
    }

    /// Kind of statement.
    #[must_use]
    pub const fn kind(&self) -> PreparedStatementKind {
        self.kind
    }

    /// Changes the kind. The text is regenerated on the next execution.
    pub fn set_kind(&mut self, kind: PreparedStatementKind) {
        self.kind = kind;
        self.dirty = true;
    }

    /// The field source.
    #[must_use]
    pub const fn field_source(&self) -> &FieldSource {
        &self.source
    }

    /// Changes the fields. The text is regenerated on the next execution.
    pub fn set_field_source(&mut self, source: FieldSource) {
        self.source = source;
        self.dirty = true;
    }

    /// Names of the fields compared with parameters in a select.
    #[must_use]
    pub fn where_field_names(&self) -> &[String] {
        &self.where_field_names
    }

    /// Changes the WHERE names. The text is regenerated on the next execution.
    pub fn set_where_field_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.where_field_names = names.into_iter().map(Into::into).collect();
        self.dirty = true;
    }

    /// Returns true if the text must be regenerated before execution.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The last text handed to the backend.
    #[must_use]
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Record id of the last inserted row, or [`NO_RECORD_ID`].
    #[must_use]
    pub const fn last_insert_record_id(&self) -> u64 {
        self.last_insert_record_id
    }

    /// Generates the statement text for the current kind and fields.
    ///
    /// # Errors
    ///
    /// Returns a `GenerationError` if there are no fields, the fields do not
    /// share one table, or a WHERE name is not one of the fields.
    pub fn generate_statement_string(&self) -> Result<String, GenerationError> {
        match self.kind {
            PreparedStatementKind::Select => self.generate_select(),
            PreparedStatementKind::Insert => self.generate_insert(),
        }
    }

    fn escape(&self, name: &str) -> String {
        self.driver.escape_identifier_if_needed(name)
    }

    fn generate_select(&self) -> Result<String, GenerationError> {
        let fields = self.source.fields();
        if fields.is_empty() {
            return Err(GenerationError::NoFields);
        }
        let names: Vec<String> = fields.iter().map(|field| self.escape(&field.name)).collect();
        let mut sql = String::from("SELECT ");
        sql.push_str(&names.join(", "));

        let table = self.owning_table(&fields)?;
        sql.push_str(" FROM ");
        sql.push_str(&self.escape(&table));

        let conditions = self
            .where_fields(&fields)?
            .iter()
            .map(|field| format!("{}=?", self.escape(&field.name)))
            .collect::<Vec<_>>();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        Ok(sql)
    }

    fn generate_insert(&self) -> Result<String, GenerationError> {
        let fields = self.source.fields();
        let table = match &self.source {
            FieldSource::Table(table) => table.name().to_string(),
            FieldSource::Fields(_) if fields.is_empty() => return Err(GenerationError::NoFields),
            FieldSource::Fields(_) => self.owning_table(&fields)?,
        };
        if fields.is_empty() {
            return Err(GenerationError::NoFields);
        }

        let placeholders = vec!["?"; fields.len()].join(",");
        let mut sql = String::from("INSERT INTO ");
        sql.push_str(&self.escape(&table));
        if matches!(self.source, FieldSource::Fields(_)) {
            let names: Vec<String> = fields.iter().map(|field| self.escape(&field.name)).collect();
            sql.push_str(" (");
            sql.push_str(&names.join(", "));
            sql.push(')');
        }
        sql.push_str(" VALUES (");
        sql.push_str(&placeholders);
        sql.push(')');
        Ok(sql)
    }

    fn owning_table(&self, fields: &[Arc<Field>]) -> Result<String, GenerationError> {
        if let FieldSource::Table(table) = &self.source {
            return Ok(table.name().to_string());
        }
        let mut tables = fields.iter().map(|field| field.table_name());
        let first = tables.next().flatten().ok_or(GenerationError::NoTable)?;
        for table in tables {
            match table {
                Some(table) if table.eq_ignore_ascii_case(first) => {}
                Some(table) => {
                    return Err(GenerationError::MixedTables {
                        first: first.to_string(),
                        second: table.to_string(),
                    })
                }
                None => return Err(GenerationError::NoTable),
            }
        }
        Ok(first.to_string())
    }

    fn where_fields(&self, fields: &[Arc<Field>]) -> Result<Vec<Arc<Field>>, GenerationError> {
        self.where_field_names
            .iter()
            .map(|name| {
                fields
                    .iter()
                    .find(|field| field.has_name(name))
                    .cloned()
                    .ok_or_else(|| {
                        warn!(field = %name, "WHERE field not found in the statement's fields");
                        GenerationError::WhereFieldNotFound(name.clone())
                    })
            })
            .collect()
    }

    /// Executes the statement with `params`.
    ///
    /// The text is regenerated and prepared first if the statement is dirty.
    /// A failure to generate or prepare leaves the statement dirty and
    /// executes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Generation` or `Error::Backend`. The failure is also
    /// recorded in [`result`](Resultable::result).
    pub fn execute(&mut self, params: &[Value]) -> Result<ExecutionSummary, Error> {
        self.result.clear();

        if self.dirty {
            let sql = self
                .generate_statement_string()
                .map_err(|err| self.record(Error::from(err), "Could not generate statement."))?;
            debug!(sql = %sql, "Preparing statement");
            self.result.set_sql(sql.as_str());
            self.interface
                .prepare(&sql)
                .map_err(|err| self.record(Error::from(err), "Could not prepare statement."))?;
            self.sql = Some(sql);
            self.dirty = false;
        }

        let fields = self.source.fields();
        let parameter_fields = match self.kind {
            PreparedStatementKind::Select => self
                .where_fields(&fields)
                .map_err(|err| self.record(Error::from(err), "Could not generate statement."))?,
            PreparedStatementKind::Insert => fields.clone(),
        };

        let summary = self
            .interface
            .execute(self.kind, &parameter_fields, &fields, params)
            .map_err(|err| self.record(Error::from(err), "Could not execute statement."))?;
        if self.kind == PreparedStatementKind::Insert {
            self.last_insert_record_id = summary.last_insert_record_id.unwrap_or(NO_RECORD_ID);
        }
        Ok(summary)
    }

    fn record(&mut self, err: Error, context: &str) -> Error {
        self.result.set_error(&err);
        self.result.prepend_message(err.code(), context);
        err
    }
}

impl Resultable for PreparedStatement {
    fn result(&self) -> &DbResult {
        &self.result
    }

    fn result_mut(&mut self) -> &mut DbResult {
        &mut self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::GenericDriver;
    use crate::schema::FieldType;
    use crate::value::ToValue;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Calls {
        prepared: Vec<String>,
        executed: Vec<(PreparedStatementKind, Vec<String>, usize)>,
        fail_prepare: bool,
    }

    struct MockInterface(Rc<RefCell<Calls>>);

    impl PreparedStatementInterface for MockInterface {
        fn prepare(&mut self, sql: &str) -> Result<(), BackendError> {
            let mut calls = self.0.borrow_mut();
            if calls.fail_prepare {
                return Err(BackendError::new(1, "SQLITE_ERROR", "syntax error"));
            }
            calls.prepared.push(sql.to_string());
            Ok(())
        }

        fn execute(
            &mut self,
            kind: PreparedStatementKind,
            parameter_fields: &[Arc<Field>],
            _fields: &[Arc<Field>],
            params: &[Value],
        ) -> Result<ExecutionSummary, BackendError> {
            let names = parameter_fields.iter().map(|f| f.name.clone()).collect();
            self.0.borrow_mut().executed.push((kind, names, params.len()));
            Ok(ExecutionSummary {
                rows_affected: 1,
                last_insert_record_id: Some(7),
            })
        }
    }

    fn cars() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("cars")
                .unwrap()
                .with_field(Field::new("id", FieldType::Integer).primary_key())
                .unwrap()
                .with_field(Field::new("owner", FieldType::Integer))
                .unwrap()
                .with_field(Field::new("model", FieldType::Text))
                .unwrap(),
        )
    }

    fn new_statement(
        kind: PreparedStatementKind,
        source: FieldSource,
    ) -> (PreparedStatement, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let statement = PreparedStatement::new(
            Arc::new(GenericDriver::new()),
            Box::new(MockInterface(Rc::clone(&calls))),
            kind,
            source,
        );
        (statement, calls)
    }

    #[test]
    fn test_select_text() {
        let (statement, _) = new_statement(PreparedStatementKind::Select, FieldSource::Table(cars()));
        let statement = statement.with_where_field_names(["id", "owner"]);
        assert_eq!(
            statement.generate_statement_string().unwrap(),
            "SELECT id, owner, model FROM cars WHERE id=? AND owner=?"
        );
    }

    #[test]
    fn test_select_unknown_where_field() {
        let (statement, _) = new_statement(PreparedStatementKind::Select, FieldSource::Table(cars()));
        let statement = statement.with_where_field_names(["ghost"]);
        assert_eq!(
            statement.generate_statement_string(),
            Err(GenerationError::WhereFieldNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_select_needs_one_owning_table() {
        let loose = Arc::new(Field::new("x", FieldType::Integer));
        let (statement, _) =
            new_statement(PreparedStatementKind::Select, FieldSource::Fields(vec![loose]));
        assert_eq!(
            statement.generate_statement_string(),
            Err(GenerationError::NoTable)
        );

        let other = Arc::new(
            TableSchema::new("persons")
                .unwrap()
                .with_field(Field::new("name", FieldType::Text))
                .unwrap(),
        );
        let fields = vec![
            Arc::clone(cars().field("model").unwrap()),
            Arc::clone(other.field("name").unwrap()),
        ];
        let (statement, calls) =
            new_statement(PreparedStatementKind::Select, FieldSource::Fields(fields));
        let mut statement = statement;
        assert!(matches!(
            statement.execute(&[]),
            Err(Error::Generation(GenerationError::MixedTables { .. }))
        ));
        assert!(statement.is_dirty());
        assert!(calls.borrow().prepared.is_empty());
    }

    #[test]
    fn test_insert_text() {
        let cars = cars();
        let (statement, _) =
            new_statement(PreparedStatementKind::Insert, FieldSource::Table(Arc::clone(&cars)));
        assert_eq!(
            statement.generate_statement_string().unwrap(),
            "INSERT INTO cars VALUES (?,?,?)"
        );

        let fields = vec![
            Arc::clone(cars.field("owner").unwrap()),
            Arc::clone(cars.field("model").unwrap()),
        ];
        let (statement, _) = new_statement(PreparedStatementKind::Insert, FieldSource::Fields(fields));
        assert_eq!(
            statement.generate_statement_string().unwrap(),
            "INSERT INTO cars (owner, model) VALUES (?,?)"
        );
    }

    #[test]
    fn test_insert_without_table() {
        let loose = Arc::new(Field::new("x", FieldType::Integer));
        let (statement, _) =
            new_statement(PreparedStatementKind::Insert, FieldSource::Fields(vec![loose]));
        assert_eq!(
            statement.generate_statement_string(),
            Err(GenerationError::NoTable)
        );
    }

    #[test]
    fn test_insert_mixed_tables() {
        let other = Arc::new(
            TableSchema::new("persons")
                .unwrap()
                .with_field(Field::new("name", FieldType::Text))
                .unwrap(),
        );
        let fields = vec![
            Arc::clone(cars().field("id").unwrap()),
            Arc::clone(other.field("name").unwrap()),
        ];
        let (statement, _) = new_statement(PreparedStatementKind::Insert, FieldSource::Fields(fields));
        assert!(matches!(
            statement.generate_statement_string(),
            Err(GenerationError::MixedTables { .. })
        ));
    }

    #[test]
    fn test_execute_prepares_once() {
        let (statement, calls) =
            new_statement(PreparedStatementKind::Insert, FieldSource::Table(cars()));
        let mut statement = statement;
        assert_eq!(statement.last_insert_record_id(), NO_RECORD_ID);

        statement.execute(&[Value::Int(1), Value::Int(2), "Fiat".to_value()]).unwrap();
        statement.execute(&[Value::Int(2), Value::Int(2), "Opel".to_value()]).unwrap();

        assert!(!statement.is_dirty());
        assert_eq!(calls.borrow().prepared.len(), 1);
        assert_eq!(calls.borrow().executed.len(), 2);
        assert_eq!(statement.last_insert_record_id(), 7);
        assert!(!statement.result().is_error());
    }

    #[test]
    fn test_change_marks_dirty() {
        let (statement, calls) =
            new_statement(PreparedStatementKind::Select, FieldSource::Table(cars()));
        let mut statement = statement.with_where_field_names(["id"]);
        statement.execute(&[Value::Int(1)]).unwrap();
        assert_eq!(calls.borrow().executed[0].1, vec!["id".to_string()]);

        statement.set_where_field_names(["owner"]);
        assert!(statement.is_dirty());
        statement.execute(&[Value::Int(3)]).unwrap();
        assert_eq!(
            calls.borrow().prepared[1],
            "SELECT id, owner, model FROM cars WHERE owner=?"
        );
    }

    #[test]
    fn test_generation_failure_stays_dirty() {
        let (statement, calls) =
            new_statement(PreparedStatementKind::Select, FieldSource::Table(cars()));
        let mut statement = statement.with_where_field_names(["ghost"]);
        let err = statement.execute(&[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(statement.is_dirty());
        assert!(statement.sql().is_none());
        assert!(calls.borrow().prepared.is_empty());
        assert!(calls.borrow().executed.is_empty());
        assert!(statement.result().is_error());
        assert!(statement.result().message().contains("ghost"));
    }

    #[test]
    fn test_prepare_failure_stays_dirty() {
        let (statement, calls) =
            new_statement(PreparedStatementKind::Insert, FieldSource::Table(cars()));
        let mut statement = statement;
        calls.borrow_mut().fail_prepare = true;
        let err = statement.execute(&[]).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
        assert!(statement.is_dirty());
        assert_eq!(statement.result().server_message(), "syntax error");
        assert_eq!(statement.result().error_sql(), "INSERT INTO cars VALUES (?,?,?)");
    }
}
