//! Table schemas.

use std::sync::Arc;

use tracing::trace;

use super::{Field, FieldId};
use crate::error::SchemaError;
use crate::identifier::is_identifier;

/// Metadata shared by tables and queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaObject {
    /// Database object id, `None` until stored.
    pub id: Option<i64>,
    /// Name.
    pub name: String,
    /// User-visible caption.
    pub caption: String,
    /// User-visible description.
    pub description: String,
}

impl SchemaObject {
    /// Creates metadata with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Caption, falling back to the name.
    #[must_use]
    pub fn caption_or_name(&self) -> &str {
        if self.caption.is_empty() {
            &self.name
        } else {
            &self.caption
        }
    }
}

/// A table and the fields it owns, in declaration order.
///
/// Tables are shared as `Arc<TableSchema>`; use [`Arc::make_mut`] to change a
/// shared table without affecting queries that hold the old snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    object: SchemaObject,
    fields: Vec<Arc<Field>>,
}

impl TableSchema {
    /// Creates an empty table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidIdentifier` if `name` is not an identifier.
    pub fn new(name: impl Into<String>) -> Result<Self, SchemaError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidIdentifier(name));
        }
        Ok(Self {
            object: SchemaObject::named(name),
            fields: Vec::new(),
        })
    }

    /// Builder form of [`add_field`](Self::add_field).
    ///
    /// # Errors
    ///
    /// See [`add_field`](Self::add_field).
    pub fn with_field(mut self, field: Field) -> Result<Self, SchemaError> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Adds `field` at the end, stamping a fresh id and the table back-reference.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateField` if a field of that name exists and
    /// `SchemaError::InvalidIdentifier` if the name is not an identifier.
    pub fn add_field(&mut self, mut field: Field) -> Result<FieldId, SchemaError> {
        if !is_identifier(&field.name) {
            return Err(SchemaError::InvalidIdentifier(field.name));
        }
        if self.field(&field.name).is_some() {
            return Err(SchemaError::DuplicateField {
                table: self.object.name.clone(),
                field: field.name,
            });
        }
        field.id = FieldId::next();
        field.table = Some(self.object.name.clone());
        trace!(table = %self.object.name, field = %field.name, id = %field.id, "Added field");
        let id = field.id;
        self.fields.push(Arc::new(field));
        Ok(id)
    }

    /// Removes the field named `name`. Returns false if absent.
    pub fn remove_field(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|field| !field.has_name(name));
        before != self.fields.len()
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.object.name
    }

    /// Table metadata.
    #[must_use]
    pub const fn object(&self) -> &SchemaObject {
        &self.object
    }

    /// Mutable metadata. The name is fixed; only id, caption and description
    /// should be changed.
    pub fn object_mut(&mut self) -> &mut SchemaObject {
        &mut self.object
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Arc<Field>] {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// First field whose name matches `name`, ignoring ASCII case.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Arc<Field>> {
        self.fields.iter().find(|field| field.has_name(name))
    }

    /// Field at `index`.
    #[must_use]
    pub fn field_at(&self, index: usize) -> Option<&Arc<Field>> {
        self.fields.get(index)
    }

    /// Field with identity `id`.
    #[must_use]
    pub fn field_by_id(&self, id: FieldId) -> Option<&Arc<Field>> {
        self.fields.iter().find(|field| field.id == id)
    }

    /// Mutable access to a field's display attributes.
    ///
    /// Copies the field if another snapshot shares it.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|field| field.has_name(name))
            .map(Arc::make_mut)
    }

    /// Fields of the primary key, in declaration order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<Arc<Field>> {
        self.fields
            .iter()
            .filter(|field| field.primary_key)
            .cloned()
            .collect()
    }
}
