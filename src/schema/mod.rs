//! Schema Binding
//!
//! Declarations (`FieldSpec`, `SectionSpec`, `Schema`) are immutable and
//! shared. Binding them against a raw store produces per-instance state
//! (`Field`, `Section`, `Config`) that owns its values outright.

mod config;
mod definition;
mod field;
mod section;

pub use config::{Config, ConfigBuilder, Schema, SchemaBuilder};
pub use field::{Field, FieldSpec};
pub use section::{Section, SectionSpec, SectionSpecBuilder};
