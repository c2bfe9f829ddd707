//! SQL text generation from schema objects.

use tracing::trace;

pub use crate::driver::IdentifierEscaping;

use crate::driver::Driver;
use crate::error::GenerationError;
use crate::expression::Expression;
use crate::schema::{
    Field, FieldType, OrderByTarget, QueryItem, QuerySchema, QueryTable, SortOrder, TableSchema,
};

/// Builds statements for one driver.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'d> {
    driver: &'d dyn Driver,
    escaping: IdentifierEscaping,
}

impl<'d> StatementBuilder<'d> {
    /// Creates a builder escaping identifiers as necessary.
    #[must_use]
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self {
            driver,
            escaping: IdentifierEscaping::AsNecessary,
        }
    }

    /// Sets the escaping mode for table, field and alias names.
    #[must_use]
    pub const fn with_escaping(mut self, escaping: IdentifierEscaping) -> Self {
        self.escaping = escaping;
        self
    }

    fn identifier(&self, name: &str) -> String {
        self.driver.escape_identifier_as(name, self.escaping)
    }

    fn expression(&self, expression: &Expression) -> String {
        expression.to_sql_escaped(self.driver, self.escaping)
    }

    /// Generates `SELECT` text for `query`.
    ///
    /// Field columns are qualified with the table name or alias when the
    /// query has more than one table. Expressions render as written.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyQuery` if the query has no columns.
    pub fn select_statement(&self, query: &QuerySchema) -> Result<String, GenerationError> {
        if query.items().is_empty() {
            return Err(GenerationError::EmptyQuery);
        }
        let qualify = query.table_count() > 1;

        let columns: Vec<String> = query
            .items()
            .iter()
            .map(|(_, item)| self.select_item(query, item, qualify))
            .collect();

        let mut sql = String::from("SELECT ");
        sql.push_str(&columns.join(", "));

        if let Some((first, rest)) = query.tables().split_first() {
            sql.push_str(" FROM ");
            sql.push_str(&self.table_reference(first));
            for (offset, table) in rest.iter().enumerate() {
                match query.join_for(offset + 1) {
                    Some(join) => {
                        sql.push(' ');
                        sql.push_str(join.join_type.as_sql());
                        sql.push(' ');
                        sql.push_str(&self.table_reference(table));
                        if let Some(condition) = &join.condition {
                            sql.push_str(" ON ");
                            sql.push_str(&self.expression(condition));
                        }
                    }
                    None => {
                        sql.push_str(", ");
                        sql.push_str(&self.table_reference(table));
                    }
                }
            }
        }

        if let Some(condition) = query.where_expression() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.expression(condition));
        }

        if !query.order_by().is_empty() {
            let order: Vec<String> = query
                .order_by()
                .iter()
                .map(|order_by| {
                    let mut item = match &order_by.target {
                        OrderByTarget::Position(position) => position.to_string(),
                        OrderByTarget::Expression(expression) => self.expression(expression),
                    };
                    if order_by.order == SortOrder::Descending {
                        item.push_str(" DESC");
                    }
                    item
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        trace!(sql = %sql, "Generated SELECT statement");
        Ok(sql)
    }

    fn select_item(&self, query: &QuerySchema, item: &QueryItem, qualify: bool) -> String {
        match item {
            QueryItem::Field {
                field,
                table_position,
                alias,
            } => {
                let mut column = self.identifier(&field.name);
                if qualify {
                    if let Some(table) = query.table(*table_position) {
                        column = format!("{}.{column}", self.identifier(table.reference_name()));
                    }
                }
                self.with_alias(column, alias.as_deref())
            }
            QueryItem::Expression { expression, alias } => {
                self.with_alias(self.expression(expression), alias.as_deref())
            }
            QueryItem::Asterisk {
                table_position: None,
            } => String::from("*"),
            QueryItem::Asterisk {
                table_position: Some(position),
            } => query.table(*position).map_or_else(
                || String::from("*"),
                |table| format!("{}.*", self.identifier(table.reference_name())),
            ),
        }
    }

    fn with_alias(&self, column: String, alias: Option<&str>) -> String {
        match alias {
            Some(alias) => format!("{column} AS {}", self.identifier(alias)),
            None => column,
        }
    }

    fn table_reference(&self, table: &QueryTable) -> String {
        let name = self.identifier(table.table.name());
        match &table.alias {
            Some(alias) => format!("{name} {}", self.identifier(alias)),
            None => name,
        }
    }

    /// Generates `CREATE TABLE` text for `table`.
    ///
    /// A single primary key field is declared inline; a compound key becomes
    /// a table constraint.
    #[must_use]
    pub fn create_table_statement(&self, table: &TableSchema) -> String {
        let primary_key = table.primary_key();
        let inline_key = primary_key.len() == 1;

        let mut definitions: Vec<String> = table
            .fields()
            .iter()
            .map(|field| format!("    {}", self.column_definition(field, inline_key)))
            .collect();
        if primary_key.len() > 1 {
            let names: Vec<String> = primary_key
                .iter()
                .map(|field| self.identifier(&field.name))
                .collect();
            definitions.push(format!("    PRIMARY KEY ({})", names.join(", ")));
        }

        let mut sql = String::from("CREATE TABLE ");
        sql.push_str(&self.identifier(table.name()));
        sql.push_str(" (\n");
        sql.push_str(&definitions.join(",\n"));
        sql.push_str("\n)");
        sql
    }

    fn column_definition(&self, field: &Field, inline_key: bool) -> String {
        let mut sql = format!("{} {}", self.identifier(&field.name), self.column_type(field));

        if field.primary_key && inline_key {
            sql.push_str(" PRIMARY KEY");
            if field.auto_increment {
                sql.push_str(" AUTOINCREMENT");
            }
        } else {
            if field.not_null {
                sql.push_str(" NOT NULL");
            }
            if field.unique && !field.primary_key {
                sql.push_str(" UNIQUE");
            }
        }

        if let Some(default) = &field.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.driver.value_to_sql(default));
        }
        sql
    }

    fn column_type(&self, field: &Field) -> String {
        let name = self.driver.sql_type_name(field.field_type);
        match (field.field_type, field.max_length, field.precision) {
            (FieldType::Text, Some(length), _) if length > 0 => format!("{name}({length})"),
            (FieldType::Float | FieldType::Double, _, Some(precision)) => {
                format!("{name}({precision},{})", field.scale.unwrap_or(0))
            }
            _ => name.to_string(),
        }
    }
}
