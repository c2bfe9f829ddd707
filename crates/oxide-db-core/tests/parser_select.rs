//! Tests for parsing SELECT statements into query schemas.

mod common;
use common::*;

use oxide_db_core::expression::{ExprToken, ExpressionClass, ExpressionType};
use oxide_db_core::schema::{ExpandMode, JoinType, OrderByTarget, QueryItem, SortOrder};
use oxide_db_core::Value;

#[test]
fn select_single_field_with_where() {
    let query = parse("SELECT id FROM cars WHERE id=1;");
    assert_eq!(query.table_count(), 1);
    assert_eq!(query.field_count(), 1);
    assert_eq!(query.tables()[0].table.name(), "cars");
    assert_eq!(query.field("id").unwrap().name, "id");
}

#[test]
fn select_is_case_insensitive() {
    let query = parse("select ID, Model from CARS where YEAR > 2000");
    assert_eq!(query.column_count(), 2);
    assert_eq!(column_names(&query), vec!["id", "model"]);
}

#[test]
fn select_asterisk() {
    let query = parse("SELECT * FROM cars");
    assert_eq!(column_names(&query), vec!["id", "owner", "model", "year"]);
}

#[test]
fn select_asterisk_over_two_tables() {
    let query = parse("SELECT * FROM cars, persons");
    assert_eq!(query.column_count(), 7);
    let columns = query.fields_expanded(ExpandMode::All);
    assert_eq!(columns[4].table_position(), Some(1));
}

#[test]
fn select_table_asterisk_with_alias() {
    let query = parse("SELECT p.* FROM cars c, persons p");
    assert_eq!(column_names(&query), vec!["id", "name", "surname"]);
    assert!(matches!(
        query.items()[0].1,
        QueryItem::Asterisk {
            table_position: Some(1)
        }
    ));
}

#[test]
fn select_column_aliases() {
    let query = parse("SELECT model AS m, year y FROM cars");
    assert_eq!(column_names(&query), vec!["m", "y"]);
    assert_eq!(query.column("m").unwrap().field().unwrap().name, "model");
}

#[test]
fn select_qualified_columns() {
    let query = parse("SELECT cars.model, p.name FROM cars, persons p WHERE cars.owner = p.id");
    let columns = query.fields_expanded(ExpandMode::All);
    assert_eq!(columns[0].table_position(), Some(0));
    assert_eq!(columns[1].table_position(), Some(1));
    assert_eq!(query.column("p.name").unwrap().name(), "name");
}

#[test]
fn select_expressions() {
    let query = parse("SELECT year + 1, model || 'x', -year FROM cars");
    assert_eq!(query.column_count(), 3);
    for (_, item) in query.items() {
        assert!(matches!(item, QueryItem::Expression { .. }));
    }
}

#[test]
fn select_without_from() {
    let query = parse("SELECT 1 + 1, 'text', X'ff', NULL, TRUE");
    assert_eq!(query.column_count(), 5);
    assert_eq!(query.table_count(), 0);
}

#[test]
fn select_aggregates() {
    let query = parse("SELECT COUNT(*), SUM(year), AVG(year), MIN(model), MAX(id) FROM cars");
    for (_, item) in query.items() {
        let QueryItem::Expression { expression, .. } = item else {
            panic!("expected expression item");
        };
        assert_eq!(expression.class(), ExpressionClass::Aggregation);
    }
}

#[test]
fn select_function_arguments_are_bound() {
    let query = parse("SELECT lower(model) FROM cars");
    let QueryItem::Expression { expression, .. } = &query.items()[0].1 else {
        panic!("expected expression item");
    };
    assert_eq!(expression.class(), ExpressionClass::Function);
    let variables = expression.variables();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].field().unwrap().name, "model");
}

#[test]
fn where_operators() {
    let query = parse(
        "SELECT id FROM cars WHERE model LIKE 'F%' AND year BETWEEN 1990 AND 2000 \
         AND owner IN (1, 2, 3) AND model IS NOT NULL OR NOT id <> 5",
    );
    let condition = query.where_expression().unwrap();
    assert_eq!(condition.token(), ExprToken::OR);
    assert_eq!(condition.variables().len(), 5);
    assert!(condition
        .variables()
        .iter()
        .all(|variable| variable.field().is_some()));
}

#[test]
fn where_query_parameters() {
    let query = parse("SELECT id FROM cars WHERE year > ? AND model = [Enter model]");
    let condition = query.where_expression().unwrap();
    let right = condition.right().unwrap().right().unwrap();
    assert_eq!(right.expression_type(), ExpressionType::QueryParameter);
    assert_eq!(right.query_parameter_message().as_deref(), Some("Enter model"));
    assert_eq!(
        condition.to_sql_with_params(None, vec![Value::Int(1999), Value::Text("Fiat".into())]),
        "year > 1999 AND model = 'Fiat'"
    );
}

#[test]
fn joins() {
    let query = parse(
        "SELECT c.model, p.name FROM cars c INNER JOIN persons p ON c.owner = p.id \
         WHERE p.surname = 'Smith'",
    );
    assert_eq!(query.joins().len(), 1);
    let join = query.join_for(1).unwrap();
    assert_eq!(join.join_type, JoinType::Inner);
    assert!(join.condition.is_some());
}

#[test]
fn outer_and_cross_joins() {
    for (sql, join_type) in [
        ("SELECT * FROM cars c LEFT JOIN persons p ON c.owner = p.id", JoinType::Left),
        ("SELECT * FROM cars c RIGHT OUTER JOIN persons p ON c.owner = p.id", JoinType::Right),
        ("SELECT * FROM cars c FULL JOIN persons p ON c.owner = p.id", JoinType::Full),
        ("SELECT * FROM cars c CROSS JOIN persons p", JoinType::Cross),
    ] {
        let query = parse(sql);
        assert_eq!(query.join_for(1).unwrap().join_type, join_type, "{sql}");
    }
}

#[test]
fn order_by() {
    let query = parse("SELECT id, model FROM cars ORDER BY model DESC, 1 ASC");
    let order = query.order_by();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0].order, SortOrder::Descending);
    assert!(matches!(order[1].target, OrderByTarget::Position(1)));
    assert_eq!(order[1].order, SortOrder::Ascending);
}

#[test]
fn self_join_keeps_both_expansions() {
    let query = parse("SELECT a.*, b.* FROM cars a, cars b");
    assert_eq!(query.fields_expanded(ExpandMode::All).len(), 8);
    assert_eq!(query.fields_expanded(ExpandMode::Unique).len(), 8);
}

#[test]
fn same_text_same_schema_is_deterministic() {
    let catalog = catalog();
    let sql = "SELECT c.model, p.* FROM cars c LEFT JOIN persons p ON c.owner = p.id";
    let first = parse_with(&catalog, sql);
    let second = parse_with(&catalog, sql);
    assert_eq!(generate(&first), generate(&second));
    let ids = |query: &oxide_db_core::QuerySchema| {
        query
            .fields_expanded(ExpandMode::All)
            .iter()
            .filter_map(|column| column.field().map(|field| field.id()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}
