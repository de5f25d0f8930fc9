//! Raw Key-Value Store
//!
//! The section → option → string source that schemas bind against.
//! `RawStore` is the only boundary the schema layer depends on;
//! `IniStore` is the classic INI implementation.

pub mod coerce;
mod ini;
mod options;

pub use ini::IniStore;
pub use options::ParserOptions;

use crate::types::{LookupError, ReadError};

/// Read-only view of a loaded configuration source
pub trait RawStore {
    /// Raw option text; fails when the section or the option is absent
    fn get(&self, section: &str, option: &str) -> Result<&str, LookupError>;

    /// Option names visible in `section`, in a stable order
    fn options(&self, section: &str) -> Result<Vec<&str>, LookupError>;

    fn has_section(&self, section: &str) -> bool;

    /// Declared section names, in file order
    fn sections(&self) -> Vec<&str>;

    fn get_bool(&self, section: &str, option: &str) -> Result<bool, ReadError> {
        Ok(coerce::parse_bool(self.get(section, option)?)?)
    }

    fn get_int(&self, section: &str, option: &str) -> Result<i64, ReadError> {
        Ok(coerce::parse_int(self.get(section, option)?)?)
    }

    fn get_float(&self, section: &str, option: &str) -> Result<f64, ReadError> {
        Ok(coerce::parse_float(self.get(section, option)?)?)
    }
}
