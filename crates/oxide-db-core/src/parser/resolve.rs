//! Name resolution: binds a [`SelectSyntax`] to table schemas.

use std::sync::Arc;

use tracing::trace;

use super::error::ParseError;
use super::syntax::{ColumnSyntax, OrderBySyntax, SelectSyntax, TableSyntax};
use crate::expression::{Expression, ExpressionType};
use crate::lexer::Span;
use crate::schema::{ExpandMode, JoinSpec, OrderBy, OrderByTarget, QuerySchema, SchemaSource};

/// Builds a [`QuerySchema`] from parsed syntax.
pub struct Resolver<'s> {
    source: &'s dyn SchemaSource,
}

impl<'s> Resolver<'s> {
    pub fn new(source: &'s dyn SchemaSource) -> Self {
        Self { source }
    }

    pub fn resolve(&self, syntax: &SelectSyntax) -> Result<QuerySchema, ParseError> {
        let mut query = QuerySchema::new();

        for table in &syntax.tables {
            self.add_table(&mut query, table)?;
        }
        for join in &syntax.joins {
            let table_position = self.add_table(&mut query, &join.table)?;
            if let Some(condition) = &join.condition {
                resolve_variables(&query, syntax, condition)?;
            }
            query
                .add_join(JoinSpec {
                    table_position,
                    join_type: join.join_type,
                    condition: join.condition.clone(),
                })
                .map_err(|err| ParseError::semantic(err.to_string(), join.table.span))?;
        }

        for column in &syntax.columns {
            match column {
                ColumnSyntax::Asterisk { table: None, span } => {
                    query.add_asterisk(None).map_err(|_| {
                        ParseError::semantic("\"*\" used without a table in FROM", *span)
                    })?;
                }
                ColumnSyntax::Asterisk {
                    table: Some(name),
                    span,
                } => {
                    let position = query.table_position(name).ok_or_else(|| {
                        ParseError::semantic(format!("Unknown table or alias '{name}'"), *span)
                    })?;
                    query
                        .add_asterisk(Some(position))
                        .map_err(|err| ParseError::semantic(err.to_string(), *span))?;
                }
                ColumnSyntax::Expression { expression, alias } => {
                    resolve_variables(&query, syntax, expression)?;
                    add_column(&mut query, expression, alias.clone());
                }
            }
        }

        if let Some(condition) = &syntax.where_clause {
            resolve_variables(&query, syntax, condition)?;
            query.set_where_expression(Some(condition.clone()));
        }

        let mut order_by = Vec::with_capacity(syntax.order_by.len());
        for item in &syntax.order_by {
            order_by.push(resolve_order_by(&query, syntax, item)?);
        }
        query.set_order_by(order_by);

        trace!(
            tables = query.table_count(),
            columns = query.column_count(),
            "Resolved SELECT statement"
        );
        Ok(query)
    }

    fn add_table(&self, query: &mut QuerySchema, table: &TableSyntax) -> Result<usize, ParseError> {
        let schema = self.source.table_schema(&table.name).ok_or_else(|| {
            ParseError::semantic(format!("Unknown table '{}'", table.name), table.span)
        })?;
        query
            .add_table(schema, table.alias.clone())
            .map_err(|_| match &table.alias {
                Some(alias) => ParseError::semantic(
                    format!("Alias '{alias}' is used for more than one table"),
                    table.span,
                ),
                None => ParseError::semantic(
                    format!(
                        "Table '{}' is used more than once; give it an alias",
                        table.name
                    ),
                    table.span,
                ),
            })
    }
}

/// A bare column becomes a field item. A repeated field falls back to an
/// expression item so the column still appears.
fn add_column(query: &mut QuerySchema, expression: &Expression, alias: Option<String>) {
    if expression.expression_type() == ExpressionType::Variable {
        if let (Some(field), Some(position)) = (expression.field(), expression.table_position()) {
            if query.add_field(position, &field, alias.clone()).is_some() {
                return;
            }
        }
    }
    query.add_expression(expression.clone(), alias);
}

fn resolve_variables(
    query: &QuerySchema,
    syntax: &SelectSyntax,
    expression: &Expression,
) -> Result<(), ParseError> {
    for variable in expression.variables() {
        resolve_variable(query, &variable, syntax.span_of(&variable))?;
    }
    Ok(())
}

fn resolve_variable(
    query: &QuerySchema,
    variable: &Expression,
    span: Span,
) -> Result<(), ParseError> {
    let name = variable.variable_column().unwrap_or_default();
    if name == "*" {
        return Ok(());
    }

    if let Some(qualifier) = variable.variable_table() {
        let position = query.table_position(&qualifier).ok_or_else(|| {
            ParseError::semantic(format!("Unknown table or alias '{qualifier}'"), span)
        })?;
        let field = query
            .table(position)
            .and_then(|table| table.table.field(&name))
            .cloned()
            .ok_or_else(|| {
                ParseError::semantic(format!("Unknown column '{qualifier}.{name}'"), span)
            })?;
        variable.resolve_variable(field, position);
        return Ok(());
    }

    let mut matches = query
        .tables()
        .iter()
        .enumerate()
        .filter_map(|(position, table)| table.table.field(&name).map(|f| (position, Arc::clone(f))));
    match (matches.next(), matches.next()) {
        (Some((position, field)), None) => {
            variable.resolve_variable(field, position);
            Ok(())
        }
        (Some(_), Some(_)) => Err(ParseError::semantic(
            format!("Ambiguous column '{name}'; qualify it with a table name or alias"),
            span,
        )),
        (None, _) => Err(ParseError::semantic(format!("Unknown column '{name}'"), span)),
    }
}

fn resolve_order_by(
    query: &QuerySchema,
    syntax: &SelectSyntax,
    item: &OrderBySyntax,
) -> Result<OrderBy, ParseError> {
    match item {
        OrderBySyntax::Position {
            position,
            order,
            span,
        } => {
            let count = query.column_count();
            let index = usize::try_from(*position)
                .ok()
                .filter(|p| (1..=count).contains(p))
                .ok_or_else(|| {
                    ParseError::semantic(
                        format!("ORDER BY column number {position} is out of range 1..{count}"),
                        *span,
                    )
                })?;
            Ok(OrderBy {
                target: OrderByTarget::Position(index),
                order: *order,
            })
        }
        OrderBySyntax::Expression { expression, order } => {
            if !is_alias_reference(query, expression) {
                resolve_variables(query, syntax, expression)?;
            }
            Ok(OrderBy {
                target: OrderByTarget::Expression(expression.clone()),
                order: *order,
            })
        }
    }
}

/// True for a bare name matching a column alias.
fn is_alias_reference(query: &QuerySchema, expression: &Expression) -> bool {
    if expression.expression_type() != ExpressionType::Variable
        || expression.variable_table().is_some()
    {
        return false;
    }
    let Some(name) = expression.variable_column() else {
        return false;
    };
    query
        .fields_expanded(ExpandMode::All)
        .iter()
        .any(|column| {
            column
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(&name))
        })
}
