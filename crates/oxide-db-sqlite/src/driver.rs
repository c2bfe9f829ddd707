//! SQLite driver descriptor.

use oxide_db_core::driver::{Driver, DriverFeatures, DriverInfo, GenericDriver};
use oxide_db_core::schema::FieldType;
use oxide_db_core::Value;

use crate::keywords::SQLITE_KEYWORDS;

static INFO: DriverInfo = DriverInfo {
    id: "sqlite",
    name: "SQLite",
    file_based: true,
    features: DriverFeatures {
        single_transactions: true,
        cursor_forward: true,
        compacting_database: true,
        last_insert_record_id: true,
        ..DriverFeatures::NONE
    },
};

/// SQLite driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    /// Creates a new SQLite driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    fn info(&self) -> &DriverInfo {
        &INFO
    }

    fn keywords(&self) -> &'static [&'static str] {
        SQLITE_KEYWORDS
    }

    // Booleans are stored as integers.
    fn value_to_sql(&self, value: &Value) -> String {
        match value {
            Value::Bool(flag) => String::from(if *flag { "1" } else { "0" }),
            other => GenericDriver::new().value_to_sql(other),
        }
    }

    // Column types follow SQLite's type affinity rules.
    fn sql_type_name(&self, field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Boolean
            | FieldType::Byte
            | FieldType::ShortInteger
            | FieldType::Integer
            | FieldType::BigInteger => "INTEGER",
            FieldType::Float | FieldType::Double => "REAL",
            FieldType::Text
            | FieldType::LongText
            | FieldType::Date
            | FieldType::Time
            | FieldType::DateTime => "TEXT",
            FieldType::Blob => "BLOB",
        }
    }
}
