//! inischema - Typed Schemas over INI Configuration
//!
//! Declare the sections and typed fields a configuration is expected to
//! have, then bind that declaration to a loaded INI store to get validated,
//! typed values with required/optional, default and frozen policies.
//!
//! ## Quick Start
//!
//! ```ignore
//! use inischema::{Config, FieldSpec, Schema, SectionSpec};
//!
//! let db = SectionSpec::builder()
//!     .field(FieldSpec::raw("host"))
//!     .field(FieldSpec::int("port"))
//!     .field(FieldSpec::bool("ssl").default(true))
//!     .field(FieldSpec::int("timeout").default(30).frozen())
//!     .build()?;
//! let schema = Schema::builder().section("db", db).build()?;
//!
//! let cfg = Config::from_path(&schema, "app.ini")?;
//! let port: u16 = cfg.get("db", "port")?;
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: Field/Section/Config declarations and binding
//! - [`store`]: Raw store trait, INI parser, coercion grammar, parser options
//! - [`types`]: Values, kinds and the error taxonomy
//! - [`cli`]: Command implementations for the `inischema` binary

pub mod cli;
pub mod schema;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Schema
pub use schema::{Config, ConfigBuilder, Field, FieldSpec, Schema, Section, SectionSpec};

// Store
pub use store::{IniStore, ParserOptions, RawStore};

// Values & Errors
pub use types::{
    CoercionError, FieldKind, FromValue, LookupError, ReadError, Result, SchemaError, StoreError,
    Value,
};
