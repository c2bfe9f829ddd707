//! Tests for connections over a mock backend.

mod common;
use common::*;

use std::sync::Arc;

use oxide_db_core::connection::ConnectionData;
use oxide_db_core::prepared::{FieldSource, PreparedStatementKind, NO_RECORD_ID};
use oxide_db_core::result::{ERR_NO_CONNECTION, ERR_ROLLBACK_OR_COMMIT_TRANSACTION};
use oxide_db_core::{Error, Resultable, ToValue, Value};

#[test]
fn connect_and_disconnect() {
    let (mut connection, log) = mock_connection();
    assert!(!connection.is_connected());
    connection.connect().unwrap();
    assert!(connection.is_connected());
    assert!(log.borrow().connected);
    connection.connect().unwrap();

    connection.disconnect().unwrap();
    assert!(!connection.is_connected());
    assert!(!log.borrow().connected);
}

#[test]
fn connect_failure_keeps_server_diagnostics() {
    let (mut connection, _log) = mock_connection_with(ConnectionData::file("generic", "missing.db"));
    let err = connection.connect().unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert!(!connection.is_connected());

    let result = connection.result();
    assert!(result.is_error());
    assert!(result.message().starts_with("Could not connect to \"localhost\"."));
    assert!(result.message().ends_with("unable to open database file"));
    assert_eq!(result.server_result().code, 14);
    assert_eq!(result.server_result().name, "CANTOPEN");
}

#[test]
fn operations_require_a_connection() {
    let (mut connection, _log) = mock_connection();
    assert!(matches!(connection.execute_sql("DELETE FROM cars"), Err(Error::NotConnected)));
    assert_eq!(connection.result().code(), ERR_NO_CONNECTION);
    assert!(connection.table_names().is_err());
    assert!(connection.begin_transaction().is_err());
    assert!(connection.table_schema("cars").is_none());
}

#[test]
fn table_names_come_from_the_backend() {
    let (mut connection, _log) = mock_connection();
    connection.connect().unwrap();
    let mut names = connection.table_names().unwrap();
    names.sort();
    assert_eq!(names, vec!["cars", "persons"]);
}

#[test]
fn parse_loads_schemas_lazily_and_caches_them() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();

    let query = connection.parse("SELECT model FROM cars WHERE year > 2000").unwrap();
    assert_eq!(query.field_count(), 1);
    assert_eq!(log.borrow().schema_loads, 1);

    connection.parse("SELECT id FROM cars").unwrap();
    assert_eq!(log.borrow().schema_loads, 1);
    let first = connection.table_schema("cars").unwrap();
    let second = connection.table_schema("CARS").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    connection.parse("SELECT * FROM cars, persons").unwrap();
    assert_eq!(log.borrow().schema_loads, 2);

    connection.disconnect().unwrap();
    connection.connect().unwrap();
    connection.parse("SELECT id FROM cars").unwrap();
    assert_eq!(log.borrow().schema_loads, 3);
}

#[test]
fn parse_failure_is_recorded() {
    let (mut connection, _log) = mock_connection();
    connection.connect().unwrap();
    let err = connection.parse("SELECT ghost FROM cars").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    let result = connection.result();
    assert!(result.message().starts_with("Could not parse SQL statement."));
    assert_eq!(result.error_sql(), "SELECT ghost FROM cars");
}

#[test]
fn parse_and_generate_through_the_connection() {
    let (mut connection, _log) = mock_connection();
    connection.connect().unwrap();
    let query = connection
        .parse("select c.model from cars c where c.year > 1990 order by 1 desc")
        .unwrap();
    assert_eq!(
        connection.select_statement(&query).unwrap(),
        "SELECT model FROM cars c WHERE c.year > 1990 ORDER BY 1 DESC"
    );
}

#[test]
fn execute_failure_builds_the_message_chain() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();

    let summary = connection.execute_sql("DELETE FROM cars").unwrap();
    assert_eq!(summary.rows_affected, 1);
    assert!(!connection.result().is_error());
    assert_eq!(log.borrow().executed, vec!["DELETE FROM cars"]);

    let err = connection.execute_sql("SELECT * FROM fail").unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    let result = connection.result();
    assert!(result.is_error());
    assert_eq!(result.error_sql(), "SELECT * FROM fail");
    assert_eq!(result.server_result().code, 1);
    assert_eq!(result.server_message(), "no such table: fail");
    assert!(result
        .message()
        .starts_with("Error while executing SQL statement. "));
    assert!(result.message().contains("no such table: fail"));

    connection.execute_sql("DELETE FROM persons").unwrap();
    assert!(!connection.result().is_error());
}

#[test]
fn prepared_insert_reports_record_ids() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();
    let cars = connection.table_schema("cars").unwrap();

    let mut statement = connection
        .prepare_statement(PreparedStatementKind::Insert, FieldSource::Table(cars))
        .unwrap();
    assert!(statement.is_dirty());
    assert_eq!(statement.last_insert_record_id(), NO_RECORD_ID);

    let row = [
        Value::Null,
        Value::Int(1),
        "Fiat".to_value(),
        Value::Int(1998),
    ];
    statement.execute(&row).unwrap();
    assert_eq!(statement.last_insert_record_id(), 1);
    statement.execute(&row).unwrap();
    assert_eq!(statement.last_insert_record_id(), 2);

    assert_eq!(log.borrow().prepared, vec!["INSERT INTO cars VALUES (?,?,?,?)"]);
    assert_eq!(statement.sql(), Some("INSERT INTO cars VALUES (?,?,?,?)"));
}

#[test]
fn prepared_select_with_where_fields() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();
    let cars = connection.table_schema("cars").unwrap();
    let fields = vec![
        Arc::clone(cars.field("model").unwrap()),
        Arc::clone(cars.field("year").unwrap()),
        Arc::clone(cars.field("owner").unwrap()),
    ];

    let mut statement = connection
        .prepare_statement(PreparedStatementKind::Select, FieldSource::Fields(fields))
        .unwrap()
        .with_where_field_names(["owner"]);
    statement.execute(&[Value::Int(7)]).unwrap();
    assert_eq!(
        log.borrow().prepared,
        vec!["SELECT model, year, owner FROM cars WHERE owner=?"]
    );

    let err = statement.execute(&[]).unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert!(statement.result().is_error());
    assert_eq!(log.borrow().prepared.len(), 1);
}

#[test]
fn transaction_lifecycle() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();

    let transaction = connection.begin_transaction().unwrap();
    assert!(transaction.is_active());
    assert_eq!(transaction.connection_id(), connection.id());
    assert_eq!(connection.transaction(), Some(&transaction));
    assert_eq!(transaction.ref_count(), 2);

    let err = connection.begin_transaction().unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));

    connection.commit_transaction(&transaction).unwrap();
    assert!(!transaction.is_active());
    assert!(connection.transaction().is_none());
    assert_eq!(transaction.ref_count(), 1);

    let err = connection.commit_transaction(&transaction).unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
    assert_eq!(connection.result().code(), ERR_ROLLBACK_OR_COMMIT_TRANSACTION);

    assert_eq!(log.borrow().transactions, vec!["BEGIN", "COMMIT"]);
}

#[test]
fn foreign_transactions_are_rejected() {
    let (mut first, _) = mock_connection();
    let (mut second, second_log) = mock_connection();
    first.connect().unwrap();
    second.connect().unwrap();
    assert_ne!(first.id(), second.id());

    let transaction = first.begin_transaction().unwrap();
    let err = second.rollback_transaction(&transaction).unwrap_err();
    assert!(matches!(err, Error::Transaction(_)));
    assert!(second.result().message().contains("another connection"));
    assert!(transaction.is_active());
    assert!(second_log.borrow().transactions.is_empty());

    first.rollback_transaction(&transaction).unwrap();
}

#[test]
fn disconnect_rolls_back_the_active_transaction() {
    let (mut connection, log) = mock_connection();
    connection.connect().unwrap();
    let transaction = connection.begin_transaction().unwrap();
    connection.disconnect().unwrap();
    assert!(!transaction.is_active());
    assert_eq!(log.borrow().transactions, vec!["BEGIN", "ROLLBACK"]);
}
