//! Show Command
//!
//! Dump the raw store as parsed, before any schema is applied.
//!
//! Usage:
//!   inischema show app.ini [-f toml|json|text]

use std::path::Path;

use crate::cli::{Output, OutputFormat, render};
use crate::store::{IniStore, ParserOptions, RawStore};

pub fn run(file: &Path, options: ParserOptions, format: OutputFormat) -> anyhow::Result<()> {
    let store = IniStore::load(file, options)?;

    if format != OutputFormat::Text {
        println!("{}", render(&store, format)?);
        return Ok(());
    }

    let output = Output::new();
    for section in store.sections() {
        output.section(&format!("[{}]", section));
        for option in store.options(section)? {
            output.entry(option, store.get(section, option)?);
        }
    }
    Ok(())
}
