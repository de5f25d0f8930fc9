//! Options Command
//!
//! Show the effective parser options after defaults, file and environment.
//!
//! Usage:
//!   inischema options [--options parser.toml] [-f toml|json]

use std::path::Path;

use crate::cli::{Output, OutputFormat, render};
use crate::store::ParserOptions;

pub fn run(file: Option<&Path>, options: &ParserOptions, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Text {
        let output = Output::new();
        match file {
            Some(path) => {
                let exists = if path.exists() { "✓" } else { "✗" };
                output.info(&format!("Options file: {} {}", exists, path.display()));
            }
            None => output.info("Options file: (none)"),
        }
    }

    println!("{}", render(options, format)?);
    Ok(())
}
