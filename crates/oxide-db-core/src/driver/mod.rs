//! Database drivers.
//!
//! A driver describes a backend engine: its capabilities, reserved words,
//! identifier quoting, literal escaping and type names. Native client code
//! lives behind [`Backend`](crate::connection::Backend); the driver itself
//! performs no I/O.

mod generic;
mod keywords;

pub use generic::GenericDriver;
pub use keywords::{contains_keyword, is_generic_keyword, GENERIC_KEYWORDS};

use core::fmt;

use crate::connection::ConnectionData;
use crate::error::Error;
use crate::identifier::{escape_identifier_and_add_quotes_with, is_identifier};
use crate::schema::FieldType;
use crate::value::{format_real, hex_upper, Value};

/// When identifiers are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierEscaping {
    /// Only reserved words and names that are not plain identifiers.
    #[default]
    AsNecessary,
    /// Every identifier.
    Always,
}

/// Optional features of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverFeatures {
    /// One transaction at a time.
    pub single_transactions: bool,
    /// Several concurrent transactions.
    pub multiple_transactions: bool,
    /// Transactions inside transactions.
    pub nested_transactions: bool,
    /// Transactions are accepted but have no effect.
    pub ignore_transactions: bool,
    /// Cursors can move forward.
    pub cursor_forward: bool,
    /// Cursors can move backward.
    pub cursor_backward: bool,
    /// The database file can be compacted.
    pub compacting_database: bool,
    /// The backend reports the record id of the last insert.
    pub last_insert_record_id: bool,
}

impl DriverFeatures {
    /// No optional features.
    pub const NONE: Self = Self {
        single_transactions: false,
        multiple_transactions: false,
        nested_transactions: false,
        ignore_transactions: false,
        cursor_forward: false,
        cursor_backward: false,
        compacting_database: false,
        last_insert_record_id: false,
    };

    /// Features assumed of an unknown SQL engine.
    pub const GENERIC: Self = Self {
        single_transactions: true,
        cursor_forward: true,
        ..Self::NONE
    };

    /// Returns true if the driver supports transactions of any kind.
    #[must_use]
    pub const fn supports_transactions(&self) -> bool {
        self.single_transactions || self.multiple_transactions || self.nested_transactions
    }
}

/// Static description of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    /// Id stored in connection data, e.g. `sqlite`.
    pub id: &'static str,
    /// User-visible name.
    pub name: &'static str,
    /// Databases are local files rather than servers.
    pub file_based: bool,
    /// Optional features.
    pub features: DriverFeatures,
}

/// Trait for driver-specific behavior.
pub trait Driver: Send + Sync + fmt::Debug {
    /// Static description of the driver.
    fn info(&self) -> &DriverInfo;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Driver-specific reserved words: uppercase, sorted, and without the
    /// generic ones.
    fn keywords(&self) -> &'static [&'static str] {
        &[]
    }

    /// Returns true if `word` is reserved, generically or by this driver.
    fn is_keyword(&self, word: &str) -> bool {
        is_generic_keyword(word) || contains_keyword(self.keywords(), word)
    }

    /// Quotes an identifier unconditionally.
    fn escape_identifier(&self, name: &str) -> String {
        escape_identifier_and_add_quotes_with(name, self.identifier_quote())
    }

    /// Quotes an identifier if it is not a plain identifier or is reserved.
    fn escape_identifier_if_needed(&self, name: &str) -> String {
        if is_identifier(name) && !self.is_keyword(name) {
            name.to_string()
        } else {
            self.escape_identifier(name)
        }
    }

    /// Quotes an identifier according to `escaping`.
    fn escape_identifier_as(&self, name: &str, escaping: IdentifierEscaping) -> String {
        match escaping {
            IdentifierEscaping::AsNecessary => self.escape_identifier_if_needed(name),
            IdentifierEscaping::Always => self.escape_identifier(name),
        }
    }

    /// Returns a string literal.
    fn escape_string(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    /// Returns a binary literal.
    fn escape_blob(&self, bytes: &[u8]) -> String {
        format!("X'{}'", hex_upper(bytes))
    }

    /// Returns the literal for `value`.
    fn value_to_sql(&self, value: &Value) -> String {
        match value {
            Value::Null => String::from("NULL"),
            Value::Bool(true) => String::from("TRUE"),
            Value::Bool(false) => String::from("FALSE"),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => format_real(*f),
            Value::Text(text) => self.escape_string(text),
            Value::Blob(bytes) => self.escape_blob(bytes),
        }
    }

    /// Returns the column type name for `field_type`.
    fn sql_type_name(&self, field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Boolean => "BOOLEAN",
            FieldType::Byte => "TINYINT",
            FieldType::ShortInteger => "SMALLINT",
            FieldType::Integer => "INTEGER",
            FieldType::BigInteger => "BIGINT",
            FieldType::Float => "REAL",
            FieldType::Double => "DOUBLE PRECISION",
            FieldType::Text => "VARCHAR",
            FieldType::LongText => "TEXT",
            FieldType::Blob => "BLOB",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "TIMESTAMP",
        }
    }

    /// Checks that `data` can be used with this driver.
    ///
    /// # Errors
    ///
    /// Returns `Error::DriverMismatch` if `data` names another driver.
    fn validate_connection_data(&self, data: &ConnectionData) -> Result<(), Error> {
        let id = self.info().id;
        if data.driver_id.is_empty() || data.driver_id.eq_ignore_ascii_case(id) {
            Ok(())
        } else {
            Err(Error::DriverMismatch {
                expected: data.driver_id.clone(),
                found: id.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_consts() {
        assert!(!DriverFeatures::NONE.supports_transactions());
        assert!(DriverFeatures::GENERIC.supports_transactions());
        assert!(!DriverFeatures::GENERIC.cursor_backward);
    }
}
