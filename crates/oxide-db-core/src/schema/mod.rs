//! Schema model: fields, tables, catalogs and queries.

mod catalog;
mod field;
mod query;
mod table;

use std::sync::Arc;

pub use catalog::Catalog;
pub use field::{Field, FieldId, FieldType};
pub use query::{
    ColumnSource, ExpandMode, ItemId, JoinSpec, JoinType, OrderBy, OrderByTarget, QueryColumnInfo,
    QueryItem, QuerySchema, QueryTable, SortOrder,
};
pub use table::{SchemaObject, TableSchema};

/// Where the parser looks up tables and fields.
///
/// Implemented by [`Catalog`] and by a connection, which loads table schemas
/// from its backend on demand.
pub trait SchemaSource {
    /// Schema of the table named `name`, ignoring ASCII case.
    fn table_schema(&self, name: &str) -> Option<Arc<TableSchema>>;

    /// Field `name` of table `table`, ignoring ASCII case.
    fn field(&self, table: &str, name: &str) -> Option<Arc<Field>> {
        self.table_schema(table)?.field(name).cloned()
    }
}
