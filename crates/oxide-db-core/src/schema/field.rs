//! Table fields.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::value::Value;

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a field.
///
/// Ids are stamped when a field is added to a table and survive copies of
/// the field, so two snapshots of the same column compare equal by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldId(u64);

impl FieldId {
    /// Id of a field that is not part of a table.
    pub const UNASSIGNED: Self = Self(0);

    pub(crate) fn next() -> Self {
        Self(NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns true for [`FieldId::UNASSIGNED`].
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Boolean.
    Boolean,
    /// 8-bit integer.
    Byte,
    /// 16-bit integer.
    ShortInteger,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInteger,
    /// Single precision real.
    Float,
    /// Double precision real.
    Double,
    /// Text with a maximum length.
    Text,
    /// Unbounded text.
    LongText,
    /// Binary data.
    Blob,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
}

impl FieldType {
    /// Returns true for the integer types.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::ShortInteger | Self::Integer | Self::BigInteger
        )
    }

    /// Returns true for the real types.
    #[must_use]
    pub const fn is_fp_numeric(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Returns true for the text types.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Text | Self::LongText)
    }
}

/// A table column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) id: FieldId,
    pub(crate) table: Option<String>,
    /// Column name.
    pub name: String,
    /// Declared type.
    pub field_type: FieldType,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// Integer values are unsigned.
    pub unsigned: bool,
    /// Total digits of a real number.
    pub precision: Option<u16>,
    /// Fractional digits of a real number.
    pub scale: Option<u16>,
    /// Maximum length of a text field.
    pub max_length: Option<u32>,
    /// Part of the primary key.
    pub primary_key: bool,
    /// `UNIQUE` constraint.
    pub unique: bool,
    /// Has an index.
    pub indexed: bool,
    /// Filled in by the database on insert.
    pub auto_increment: bool,
    /// Default value.
    pub default: Option<Value>,
    /// User-visible caption.
    pub caption: String,
    /// User-visible description.
    pub description: String,
}

impl Field {
    /// Creates a nullable field not attached to a table.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: FieldId::UNASSIGNED,
            table: None,
            name: name.into(),
            field_type,
            not_null: false,
            unsigned: false,
            precision: None,
            scale: None,
            max_length: None,
            primary_key: false,
            unique: false,
            indexed: false,
            auto_increment: false,
            default: None,
            caption: String::new(),
            description: String::new(),
        }
    }

    /// Sets NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the field as unsigned.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub fn precision(mut self, precision: u16, scale: u16) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Sets the maximum text length.
    #[must_use]
    pub fn max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Sets PRIMARY KEY. Primary key fields are NOT NULL, unique and indexed.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self.unique = true;
        self.indexed = true;
        self
    }

    /// Sets UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the indexed flag.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Sets AUTOINCREMENT.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the caption.
    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Identity of the field.
    #[must_use]
    pub const fn id(&self) -> FieldId {
        self.id
    }

    /// Name of the owning table.
    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
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

    /// Returns true if `name` matches the field name, ignoring ASCII case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let field = Field::new("id", FieldType::Integer).primary_key().auto_increment();
        assert!(field.primary_key && field.not_null && field.unique && field.auto_increment);
        assert!(field.id().is_unassigned());
        assert_eq!(field.table_name(), None);
        assert_eq!(field.caption_or_name(), "id");
    }

    #[test]
    fn test_caption_does_not_change_identity() {
        let mut field = Field::new("price", FieldType::Double);
        field.id = FieldId::next();
        let id = field.id();
        field.caption = String::from("Price");
        assert_eq!(field.id(), id);
        assert_eq!(field.caption_or_name(), "Price");
    }

    #[test]
    fn test_field_ids_are_distinct() {
        assert_ne!(FieldId::next(), FieldId::next());
    }

    #[test]
    fn test_type_groups() {
        assert!(FieldType::BigInteger.is_integer());
        assert!(FieldType::Double.is_fp_numeric());
        assert!(FieldType::LongText.is_text());
        assert!(!FieldType::Blob.is_text());
        assert!(Field::new("Name", FieldType::Text).has_name("NAME"));
    }

    #[test]
    fn test_field_type_serde_names() {
        let parsed: FieldType = serde_json::from_str("\"short_integer\"").unwrap();
        assert_eq!(parsed, FieldType::ShortInteger);
        assert_eq!(serde_json::to_string(&FieldType::DateTime).unwrap(), "\"date_time\"");
    }
}
