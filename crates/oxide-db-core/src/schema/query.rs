//! Query schemas.
//!
//! A [`QuerySchema`] is the logical form of a `SELECT`: ordered items (fields,
//! expressions and asterisks) over ordered source tables, plus joins, a WHERE
//! condition and an ORDER BY list.
//!
//! Asterisks are expanded on read. The expansion is cached and tagged with a
//! version counter that every structural change bumps, so repeated reads of an
//! unchanged query return the same shared slice.

use core::fmt;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::{Field, FieldId, SchemaObject, TableSchema};
use crate::error::SchemaError;
use crate::expression::Expression;

/// Identity of a query item, unique within its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}", self.0)
    }
}

/// A selected item.
#[derive(Debug, Clone)]
pub enum QueryItem {
    /// A column of one of the query's tables.
    Field {
        /// The field snapshot.
        field: Arc<Field>,
        /// Position of the owning table in the query.
        table_position: usize,
        /// Optional `AS` name.
        alias: Option<String>,
    },
    /// A computed column.
    Expression {
        /// The expression.
        expression: Expression,
        /// Optional `AS` name.
        alias: Option<String>,
    },
    /// `*` (all tables) or `t.*` (one table position).
    Asterisk {
        /// `None` for all tables.
        table_position: Option<usize>,
    },
}

/// A source table and its alias.
#[derive(Debug, Clone)]
pub struct QueryTable {
    /// The table snapshot.
    pub table: Arc<TableSchema>,
    /// Optional alias.
    pub alias: Option<String>,
}

impl QueryTable {
    /// Name the query uses for the table: the alias if there is one.
    #[must_use]
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.table.name())
    }
}

/// Kind of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// `INNER JOIN`.
    Inner,
    /// `LEFT OUTER JOIN`.
    Left,
    /// `RIGHT OUTER JOIN`.
    Right,
    /// `FULL OUTER JOIN`.
    Full,
    /// `CROSS JOIN`.
    Cross,
}

impl JoinType {
    /// SQL keywords of the join.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT OUTER JOIN",
            Self::Right => "RIGHT OUTER JOIN",
            Self::Full => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

/// A join of the table at `table_position` to the tables before it.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    /// Position of the joined table.
    pub table_position: usize,
    /// Kind of join.
    pub join_type: JoinType,
    /// `ON` condition.
    pub condition: Option<Expression>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// `ASC`.
    #[default]
    Ascending,
    /// `DESC`.
    Descending,
}

/// What an ORDER BY entry sorts on.
#[derive(Debug, Clone)]
pub enum OrderByTarget {
    /// 1-based column number.
    Position(usize),
    /// An expression, usually a column or an alias.
    Expression(Expression),
}

/// An ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderBy {
    /// Sort key.
    pub target: OrderByTarget,
    /// Direction.
    pub order: SortOrder,
}

/// How [`QuerySchema::fields_expanded`] treats repeated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandMode {
    /// Every item contributes all its columns.
    All,
    /// A field already seen (same identity, same table position) is skipped.
    Unique,
}

/// Where an expanded column comes from.
#[derive(Debug, Clone)]
pub enum ColumnSource {
    /// A table field.
    Field {
        /// The field snapshot.
        field: Arc<Field>,
        /// Position of the owning table in the query.
        table_position: usize,
    },
    /// A computed expression.
    Expression(Expression),
}

/// One column of an expanded query.
#[derive(Debug, Clone)]
pub struct QueryColumnInfo {
    /// The item that produced the column.
    pub item: ItemId,
    /// Field or expression.
    pub source: ColumnSource,
    /// `AS` name of the item.
    pub alias: Option<String>,
}

impl QueryColumnInfo {
    /// The field, for field columns.
    #[must_use]
    pub const fn field(&self) -> Option<&Arc<Field>> {
        match &self.source {
            ColumnSource::Field { field, .. } => Some(field),
            ColumnSource::Expression(_) => None,
        }
    }

    /// Owning table position, for field columns.
    #[must_use]
    pub const fn table_position(&self) -> Option<usize> {
        match &self.source {
            ColumnSource::Field { table_position, .. } => Some(*table_position),
            ColumnSource::Expression(_) => None,
        }
    }

    /// The alias, else the field name, else the expression text.
    #[must_use]
    pub fn name(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.source {
            ColumnSource::Field { field, .. } => field.name.clone(),
            ColumnSource::Expression(expression) => expression.to_sql(None),
        }
    }
}

#[derive(Debug, Clone)]
struct Expansion {
    version: u64,
    all: Rc<[QueryColumnInfo]>,
    unique: Rc<[QueryColumnInfo]>,
}

/// The logical form of a SELECT statement.
#[derive(Debug, Default)]
pub struct QuerySchema {
    object: SchemaObject,
    items: Vec<(ItemId, QueryItem)>,
    tables: Vec<QueryTable>,
    joins: Vec<JoinSpec>,
    where_expression: Option<Expression>,
    order_by: Vec<OrderBy>,
    next_item: u64,
    version: u64,
    cache: RefCell<Option<Expansion>>,
}

impl QuerySchema {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query metadata.
    #[must_use]
    pub const fn object(&self) -> &SchemaObject {
        &self.object
    }

    /// Mutable query metadata.
    pub fn object_mut(&mut self) -> &mut SchemaObject {
        &mut self.object
    }

    /// Structural version. Changes whenever items or tables change.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version += 1;
    }

    fn next_item_id(&mut self) -> ItemId {
        self.next_item += 1;
        ItemId(self.next_item)
    }

    /// Adds a source table and returns its position.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateTable` if another table is already
    /// referenced by the same name or alias.
    pub fn add_table(
        &mut self,
        table: Arc<TableSchema>,
        alias: Option<String>,
    ) -> Result<usize, SchemaError> {
        let entry = QueryTable { table, alias };
        let reference = entry.reference_name().to_string();
        if self
            .tables
            .iter()
            .any(|t| t.reference_name().eq_ignore_ascii_case(&reference))
        {
            return Err(SchemaError::DuplicateTable(reference));
        }
        self.tables.push(entry);
        self.bump();
        Ok(self.tables.len() - 1)
    }

    /// Source tables in order.
    #[must_use]
    pub fn tables(&self) -> &[QueryTable] {
        &self.tables
    }

    /// Source table at `position`.
    #[must_use]
    pub fn table(&self, position: usize) -> Option<&QueryTable> {
        self.tables.get(position)
    }

    /// Number of source tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Position of the first table referenced as `name`.
    ///
    /// Aliases are matched first, then names of unaliased tables, ignoring
    /// ASCII case.
    #[must_use]
    pub fn table_position(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.reference_name().eq_ignore_ascii_case(name))
    }

    /// Adds `field` of the table at `table_position` as a column.
    ///
    /// Returns `None` if the position is out of range, the field does not
    /// belong to that table, or the same field is already an explicit item.
    pub fn add_field(
        &mut self,
        table_position: usize,
        field: &Arc<Field>,
        alias: Option<String>,
    ) -> Option<ItemId> {
        let table = self.tables.get(table_position)?;
        table.table.field_by_id(field.id())?;
        let duplicate = self.items.iter().any(|(_, item)| {
            matches!(item, QueryItem::Field { field: f, table_position: p, .. }
                if f.id() == field.id() && *p == table_position)
        });
        if duplicate {
            return None;
        }
        let id = self.next_item_id();
        self.items.push((
            id,
            QueryItem::Field {
                field: Arc::clone(field),
                table_position,
                alias,
            },
        ));
        self.bump();
        Some(id)
    }

    /// Adds a computed column.
    pub fn add_expression(&mut self, expression: Expression, alias: Option<String>) -> ItemId {
        let id = self.next_item_id();
        self.items
            .push((id, QueryItem::Expression { expression, alias }));
        self.bump();
        id
    }

    /// Adds `*` (with `None`) or `t.*` for the table at a position.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::TablePositionOutOfRange` if the position does not
    /// exist, or if the query has no tables at all.
    pub fn add_asterisk(&mut self, table_position: Option<usize>) -> Result<ItemId, SchemaError> {
        let position = table_position.unwrap_or(0);
        if position >= self.tables.len() {
            return Err(SchemaError::TablePositionOutOfRange(position));
        }
        let id = self.next_item_id();
        self.items.push((id, QueryItem::Asterisk { table_position }));
        self.bump();
        Ok(id)
    }

    /// Items in order.
    #[must_use]
    pub fn items(&self) -> &[(ItemId, QueryItem)] {
        &self.items
    }

    /// The item with identity `id`.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&QueryItem> {
        self.items
            .iter()
            .find(|(item_id, _)| *item_id == id)
            .map(|(_, item)| item)
    }

    /// Number of items, counting each asterisk once.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if any item is an asterisk.
    #[must_use]
    pub fn has_asterisks(&self) -> bool {
        self.items
            .iter()
            .any(|(_, item)| matches!(item, QueryItem::Asterisk { .. }))
    }

    /// Removes an item. Returns false if absent.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|(item_id, _)| *item_id != id);
        let removed = before != self.items.len();
        if removed {
            self.bump();
        }
        removed
    }

    /// Removes every explicit item for `field`. Returns false if there was none.
    pub fn remove_field(&mut self, field: &Field) -> bool {
        let before = self.items.len();
        self.items.retain(|(_, item)| {
            !matches!(item, QueryItem::Field { field: f, .. } if f.id() == field.id())
        });
        let removed = before != self.items.len();
        if removed {
            self.bump();
        }
        removed
    }

    /// Removes the table at `position` together with the fields, asterisks,
    /// expressions and joins bound to it. Later positions shift down by one.
    ///
    /// A WHERE condition, JOIN condition or ORDER BY expression that refers to
    /// the table is dropped, as are ORDER BY positions past the remaining
    /// columns. Returns false if the position does not exist.
    pub fn remove_table(&mut self, position: usize) -> bool {
        if position >= self.tables.len() {
            return false;
        }
        self.tables.remove(position);

        self.items.retain(|(_, item)| match item {
            QueryItem::Field { table_position, .. } => *table_position != position,
            QueryItem::Asterisk { table_position } => *table_position != Some(position),
            QueryItem::Expression { expression, .. } => !refers_to(expression, position),
        });
        if self.tables.is_empty() {
            self.items
                .retain(|(_, item)| !matches!(item, QueryItem::Asterisk { .. }));
        }
        for (_, item) in &mut self.items {
            match item {
                QueryItem::Field { table_position, .. } => shift(table_position, position),
                QueryItem::Asterisk {
                    table_position: Some(table_position),
                } => shift(table_position, position),
                QueryItem::Expression { expression, .. } => shift_variables(expression, position),
                QueryItem::Asterisk { table_position: None } => {}
            }
        }

        self.joins.retain(|join| join.table_position != position);
        for join in &mut self.joins {
            shift(&mut join.table_position, position);
            if join
                .condition
                .as_ref()
                .is_some_and(|condition| refers_to(condition, position))
            {
                join.condition = None;
            }
            if let Some(condition) = &join.condition {
                shift_variables(condition, position);
            }
        }
        // The first remaining table starts the FROM list and cannot be joined.
        self.joins.retain(|join| join.table_position > 0);

        if self
            .where_expression
            .as_ref()
            .is_some_and(|condition| refers_to(condition, position))
        {
            self.where_expression = None;
        }
        if let Some(condition) = &self.where_expression {
            shift_variables(condition, position);
        }

        self.order_by.retain(|order_by| match &order_by.target {
            OrderByTarget::Expression(expression) => !refers_to(expression, position),
            OrderByTarget::Position(_) => true,
        });
        for order_by in &self.order_by {
            if let OrderByTarget::Expression(expression) = &order_by.target {
                shift_variables(expression, position);
            }
        }

        self.bump();
        let columns = self.column_count();
        self.order_by.retain(|order_by| match order_by.target {
            OrderByTarget::Position(column) => column <= columns,
            OrderByTarget::Expression(_) => true,
        });
        true
    }

    /// Adds a join.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::TablePositionOutOfRange` if the joined table is
    /// not part of the query.
    pub fn add_join(&mut self, join: JoinSpec) -> Result<(), SchemaError> {
        if join.table_position >= self.tables.len() {
            return Err(SchemaError::TablePositionOutOfRange(join.table_position));
        }
        self.joins.push(join);
        Ok(())
    }

    /// Joins in order.
    #[must_use]
    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    /// The join for the table at `position`.
    #[must_use]
    pub fn join_for(&self, position: usize) -> Option<&JoinSpec> {
        self.joins.iter().find(|join| join.table_position == position)
    }

    /// Sets or clears the WHERE condition.
    pub fn set_where_expression(&mut self, condition: Option<Expression>) {
        self.where_expression = condition;
    }

    /// The WHERE condition.
    #[must_use]
    pub const fn where_expression(&self) -> Option<&Expression> {
        self.where_expression.as_ref()
    }

    /// Replaces the ORDER BY list.
    pub fn set_order_by(&mut self, order_by: Vec<OrderBy>) {
        self.order_by = order_by;
    }

    /// The ORDER BY list.
    #[must_use]
    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Expanded columns.
    ///
    /// Field items give one column, an asterisk over a table gives every field
    /// of the table in table order, an asterisk over all tables does so for
    /// each table in order. The result is shared until the next structural
    /// change.
    #[must_use]
    pub fn fields_expanded(&self, mode: ExpandMode) -> Rc<[QueryColumnInfo]> {
        let expansion = self.expansion();
        match mode {
            ExpandMode::All => expansion.all,
            ExpandMode::Unique => expansion.unique,
        }
    }

    /// Number of expanded columns, duplicates included.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.fields_expanded(ExpandMode::All).len()
    }

    fn expansion(&self) -> Expansion {
        let mut cache = self.cache.borrow_mut();
        if let Some(cached) = cache.as_ref().filter(|c| c.version == self.version) {
            return cached.clone();
        }
        debug!(version = self.version, items = self.items.len(), "Expanding query columns");
        let all = self.expand_all();
        let mut seen = HashSet::new();
        let unique: Vec<_> = all
            .iter()
            .filter(|column| match &column.source {
                ColumnSource::Field {
                    field,
                    table_position,
                } => seen.insert((field.id(), *table_position)),
                ColumnSource::Expression(_) => true,
            })
            .cloned()
            .collect();
        let expansion = Expansion {
            version: self.version,
            all: all.into(),
            unique: unique.into(),
        };
        *cache = Some(expansion.clone());
        expansion
    }

    fn expand_all(&self) -> Vec<QueryColumnInfo> {
        let mut columns = Vec::new();
        for (id, item) in &self.items {
            match item {
                QueryItem::Field {
                    field,
                    table_position,
                    alias,
                } => columns.push(QueryColumnInfo {
                    item: *id,
                    source: ColumnSource::Field {
                        field: Arc::clone(field),
                        table_position: *table_position,
                    },
                    alias: alias.clone(),
                }),
                QueryItem::Expression { expression, alias } => columns.push(QueryColumnInfo {
                    item: *id,
                    source: ColumnSource::Expression(expression.clone()),
                    alias: alias.clone(),
                }),
                QueryItem::Asterisk { table_position } => {
                    let positions = match table_position {
                        Some(position) => *position..*position + 1,
                        None => 0..self.tables.len(),
                    };
                    for position in positions {
                        let Some(table) = self.tables.get(position) else {
                            continue;
                        };
                        columns.extend(table.table.fields().iter().map(|field| QueryColumnInfo {
                            item: *id,
                            source: ColumnSource::Field {
                                field: Arc::clone(field),
                                table_position: position,
                            },
                            alias: None,
                        }));
                    }
                }
            }
        }
        columns
    }

    /// First expanded column named `name`, ignoring ASCII case.
    ///
    /// `name` is matched against aliases and field names; `t.f` matches the
    /// field `f` of the table referenced as `t`.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<QueryColumnInfo> {
        let columns = self.fields_expanded(ExpandMode::All);
        if let Some((qualifier, field_name)) = name.split_once('.') {
            let position = self.table_position(qualifier)?;
            return columns
                .iter()
                .find(|column| {
                    column.table_position() == Some(position)
                        && column.field().is_some_and(|f| f.has_name(field_name))
                })
                .cloned();
        }
        columns
            .iter()
            .find(|column| {
                column
                    .alias
                    .as_deref()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(name))
                    || column.field().is_some_and(|f| f.has_name(name))
            })
            .cloned()
    }

    /// Field of the first column named `name`. See [`column`](Self::column).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Arc<Field>> {
        self.column(name).and_then(|column| column.field().cloned())
    }

    /// Identities of the explicit field items.
    #[must_use]
    pub fn explicit_field_ids(&self) -> Vec<FieldId> {
        self.items
            .iter()
            .filter_map(|(_, item)| match item {
                QueryItem::Field { field, .. } => Some(field.id()),
                _ => None,
            })
            .collect()
    }
}

fn shift(table_position: &mut usize, removed: usize) {
    if *table_position > removed {
        *table_position -= 1;
    }
}

fn refers_to(expression: &Expression, position: usize) -> bool {
    expression
        .variables()
        .iter()
        .any(|variable| variable.table_position() == Some(position))
}

fn shift_variables(expression: &Expression, removed: usize) {
    for variable in expression.variables() {
        if let (Some(field), Some(position)) = (variable.field(), variable.table_position()) {
            if position > removed {
                variable.resolve_variable(field, position - 1);
            }
        }
    }
}
