//! JSON schema fixtures.
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "name": "cars",
//!       "fields": [
//!         { "name": "id", "type": "integer", "primary_key": true, "auto_increment": true },
//!         { "name": "model", "type": "text", "max_length": 40, "not_null": true },
//!         { "name": "sold", "type": "boolean", "default": false }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use oxide_db_core::schema::{Catalog, Field, FieldType, TableSchema};
use oxide_db_core::{Error, Value};

use crate::error::{HarnessError, Result};

/// A set of tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Tables in declaration order.
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

/// A table of a [`SchemaFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name.
    pub name: String,
    /// Optional caption.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// A field of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u16>,
    /// Default value: null, a boolean, a number or a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
}

impl FieldDefinition {
    fn to_field(&self) -> Field {
        let mut field = Field::new(self.name.as_str(), self.field_type);
        if self.primary_key {
            field = field.primary_key();
        }
        if self.auto_increment {
            field = field.auto_increment();
        }
        if self.not_null {
            field = field.not_null();
        }
        if self.unique {
            field = field.unique();
        }
        if self.indexed {
            field = field.indexed();
        }
        if self.unsigned {
            field = field.unsigned();
        }
        if let Some(length) = self.max_length {
            field = field.max_length(length);
        }
        if let Some(precision) = self.precision {
            field = field.precision(precision, self.scale.unwrap_or(0));
        }
        if let Some(default) = &self.default {
            field = field.default_value(json_to_value(default));
        }
        if !self.caption.is_empty() {
            field = field.caption(self.caption.as_str());
        }
        field
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Bool(*flag),
        serde_json::Value::Number(number) => number
            .as_i64()
            .map_or_else(|| Value::Float(number.as_f64().unwrap_or_default()), Value::Int),
        serde_json::Value::String(text) => Value::Text(text.clone()),
        other => Value::Text(other.to_string()),
    }
}

impl SchemaFile {
    /// Parses a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` for malformed JSON or unknown field types.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reads a schema file.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Io` or `HarnessError::Json`.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds a catalog holding every table.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Schema` for invalid names or duplicates.
    pub fn to_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        for definition in &self.tables {
            let mut table = TableSchema::new(definition.name.as_str()).map_err(Error::from)?;
            if !definition.caption.is_empty() {
                table.object_mut().caption.clone_from(&definition.caption);
            }
            for field in &definition.fields {
                table.add_field(field.to_field()).map_err(Error::from)?;
            }
            debug!(table = %definition.name, fields = table.field_count(), "Loaded table");
            catalog.add_table(table).map_err(Error::from)?;
        }
        Ok(catalog)
    }
}
