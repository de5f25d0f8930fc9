//! Declarative schema files
//!
//! A schema can be declared as TOML, one table per field:
//!
//! ```toml
//! [db.host]
//! kind = "raw"
//!
//! [db.port]
//! kind = "int"
//!
//! [db.timeout]
//! kind = "int"
//! default = 30
//! frozen = true
//! ```
//!
//! Sections and fields keep file order.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::config::Schema;
use super::field::FieldSpec;
use super::section::SectionSpec;
use crate::types::{FieldKind, Result, SchemaError, Value};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldDef {
    #[serde(default)]
    kind: FieldKind,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    frozen: bool,
}

fn default_required() -> bool {
    true
}

impl FieldDef {
    fn into_spec(self, name: &str) -> FieldSpec {
        let mut spec = FieldSpec::new(name, self.kind).required(self.required);
        if let Some(default) = self.default {
            spec = spec.default(default);
        }
        if self.frozen {
            spec = spec.frozen();
        }
        spec
    }
}

impl Schema {
    /// Parse a TOML schema declaration
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(text).map_err(|e| SchemaError::SchemaFile(e.to_string()))?;

        let mut schema = Schema::builder();
        for (section_name, fields) in table {
            let toml::Value::Table(fields) = fields else {
                return Err(SchemaError::SchemaFile(format!(
                    "\"{}\" must be a table of fields",
                    section_name
                )));
            };

            let mut section = SectionSpec::builder();
            for (field_name, def) in fields {
                let def = FieldDef::deserialize(def).map_err(|e| {
                    SchemaError::SchemaFile(format!("{}.{}: {}", section_name, field_name, e))
                })?;
                section = section.field(def.into_spec(&field_name));
            }
            schema = schema.section(section_name, section.build()?);
        }

        schema.build()
    }

    /// Read and parse a TOML schema declaration
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading schema from: {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| SchemaError::SchemaFile(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }
}
