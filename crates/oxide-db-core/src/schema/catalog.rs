//! In-memory set of tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{SchemaSource, TableSchema};
use crate::error::SchemaError;

/// Tables keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: BTreeMap<String, Arc<TableSchema>>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateTable` if a table with the same name
    /// (ignoring ASCII case) is present.
    pub fn add_table(&mut self, table: impl Into<Arc<TableSchema>>) -> Result<(), SchemaError> {
        let table = table.into();
        let key = table.name().to_ascii_lowercase();
        if self.tables.contains_key(&key) {
            return Err(SchemaError::DuplicateTable(table.name().to_string()));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    /// Adds or replaces a table.
    pub fn insert(&mut self, table: Arc<TableSchema>) {
        self.tables.insert(table.name().to_ascii_lowercase(), table);
    }

    /// Removes a table. Returns false if absent.
    pub fn remove_table(&mut self, name: &str) -> bool {
        self.tables.remove(&name.to_ascii_lowercase()).is_some()
    }

    /// Looks up a table, ignoring ASCII case.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Arc<TableSchema>> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Table names in lowercase order.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name().to_string()).collect()
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if there are no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Removes every table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}

impl SchemaSource for Catalog {
    fn table_schema(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.table(name).cloned()
    }
}
