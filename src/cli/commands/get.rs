//! Get Command
//!
//! Print one option coerced to a kind.
//!
//! Usage:
//!   inischema get app.ini db port --kind int

use std::path::Path;

use crate::store::{IniStore, ParserOptions, RawStore, coerce};
use crate::types::{FieldKind, SchemaError};

pub fn run(
    file: &Path,
    section: &str,
    option: &str,
    kind: FieldKind,
    options: ParserOptions,
) -> anyhow::Result<()> {
    let store = IniStore::load(file, options)?;
    let raw = store.get(section, option)?;
    let value = coerce::coerce(kind, raw).map_err(|e| SchemaError::coercion(section, option, e))?;
    println!("{}", value);
    Ok(())
}
