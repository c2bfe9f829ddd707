//! Generic SQL driver.

use super::{Driver, DriverFeatures, DriverInfo};

static INFO: DriverInfo = DriverInfo {
    id: "generic",
    name: "Generic SQL",
    file_based: false,
    features: DriverFeatures::GENERIC,
};

/// A driver following ANSI SQL conventions, without backend-specific words.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDriver;

impl GenericDriver {
    /// Creates a new generic driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for GenericDriver {
    fn info(&self) -> &DriverInfo {
        &INFO
    }
}
