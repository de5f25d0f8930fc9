//! Unified Error Type System
//!
//! Centralized error types for schema binding and the raw store.
//!
//! ## Error Families
//!
//! - **Configuration absence**: no source supplied, or a required option is missing
//! - **Schema violation**: coercion failures, frozen writes, reads before binding
//! - **Store**: I/O and syntax failures of the underlying INI store
//!
//! ## Design Principles
//!
//! - One error type (`SchemaError`) crosses the public API
//! - Store failures are wrapped, never flattened into "missing"
//! - No panic/unwrap - misuse of accessors surfaces as an error variant

use std::path::PathBuf;
use thiserror::Error;

use super::value::FieldKind;

// =============================================================================
// Lookup Error
// =============================================================================

/// Why a `(section, option)` lookup against a raw store failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("No section: \"{section}\"")]
    NoSection { section: String },

    #[error("No option \"{option}\" in section: \"{section}\"")]
    NoOption { section: String, option: String },
}

impl LookupError {
    pub fn no_section(section: impl Into<String>) -> Self {
        Self::NoSection {
            section: section.into(),
        }
    }

    pub fn no_option(section: impl Into<String>, option: impl Into<String>) -> Self {
        Self::NoOption {
            section: section.into(),
            option: option.into(),
        }
    }

    /// True when the whole section was absent rather than a single option
    pub fn is_section_missing(&self) -> bool {
        matches!(self, Self::NoSection { .. })
    }
}

// =============================================================================
// Coercion Error
// =============================================================================

/// Raw text (or a written value) could not be turned into the field's kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {input:?} to {kind}: {reason}")]
pub struct CoercionError {
    pub kind: FieldKind,
    pub input: String,
    pub reason: String,
}

impl CoercionError {
    pub fn new(kind: FieldKind, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a typed store read (`get_bool`, `get_int`, `get_float`)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

// =============================================================================
// Store Error
// =============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("Section \"{section}\" already exists ({source_name}, line {line})")]
    DuplicateSection {
        source_name: String,
        section: String,
        line: usize,
    },

    #[error(
        "Option \"{option}\" in section \"{section}\" already exists ({source_name}, line {line})"
    )]
    DuplicateOption {
        source_name: String,
        section: String,
        option: String,
        line: usize,
    },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported TOML value for \"{option}\" in section \"{section}\": {found}")]
    UnsupportedToml {
        section: String,
        option: String,
        found: String,
    },
}

// =============================================================================
// Schema Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SchemaError {
    // -------------------------------------------------------------------------
    // Configuration Absence
    // -------------------------------------------------------------------------
    #[error("No path to config or prepared config specified.")]
    NoConfig,

    #[error("Option \"{option}\" in section \"{section}\" is required.")]
    MissingField {
        section: String,
        option: String,
        #[source]
        cause: LookupError,
    },

    // -------------------------------------------------------------------------
    // Schema Violations
    // -------------------------------------------------------------------------
    #[error("Cannot set frozen field \"{option}\" in section \"{section}\"")]
    FrozenField { section: String, option: String },

    #[error("Invalid value for option \"{option}\" in section \"{section}\": {source}")]
    Coercion {
        section: String,
        option: String,
        #[source]
        source: CoercionError,
    },

    #[error("Field \"{option}\" has not been resolved yet")]
    Unbound { section: Option<String>, option: String },

    #[error("Option \"{option}\" in section \"{section}\" holds {found}, expected {expected}")]
    TypeMismatch {
        section: String,
        option: String,
        expected: &'static str,
        found: String,
    },

    // -------------------------------------------------------------------------
    // Accessor / Definition Misuse
    // -------------------------------------------------------------------------
    #[error("Section \"{0}\" is not declared in this schema")]
    UnknownSection(String),

    #[error("Field \"{option}\" is not declared in section \"{section}\"")]
    UnknownField { section: String, option: String },

    #[error("Section \"{0}\" is declared more than once")]
    DuplicateSection(String),

    #[error("Field \"{0}\" is declared more than once")]
    DuplicateField(String),

    #[error("Schema file error: {0}")]
    SchemaFile(String),

    // -------------------------------------------------------------------------
    // Collaborators
    // -------------------------------------------------------------------------
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Parser options error: {0}")]
    Options(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl SchemaError {
    pub fn missing_field(
        section: impl Into<String>,
        option: impl Into<String>,
        cause: LookupError,
    ) -> Self {
        Self::MissingField {
            section: section.into(),
            option: option.into(),
            cause,
        }
    }

    pub fn frozen_field(section: impl Into<String>, option: impl Into<String>) -> Self {
        Self::FrozenField {
            section: section.into(),
            option: option.into(),
        }
    }

    pub fn coercion(
        section: impl Into<String>,
        option: impl Into<String>,
        source: CoercionError,
    ) -> Self {
        Self::Coercion {
            section: section.into(),
            option: option.into(),
            source,
        }
    }

    /// Errors raised while the configuration source itself is absent or incomplete
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::NoConfig | Self::MissingField { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================
