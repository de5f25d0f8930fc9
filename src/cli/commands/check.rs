//! Check Command
//!
//! Bind a declarative schema against an INI file and report the result.
//!
//! Usage:
//!   inischema check app.ini --schema schema.toml [-f text|toml|json]

use std::path::Path;

use crate::cli::{Output, OutputFormat, render};
use crate::schema::{Config, Schema};
use crate::store::ParserOptions;

pub fn run(
    file: &Path,
    schema_path: &Path,
    options: ParserOptions,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let schema = Schema::from_file(schema_path)?;
    let output = Output::new();

    let config = Config::builder(&schema)
        .path(file)
        .parser_options(options)
        .build()?;

    if format != OutputFormat::Text {
        println!("{}", render(&config, format)?);
        return Ok(());
    }

    for section in config.sections() {
        output.section(&format!("[{}]", section.name()));
        for field in section.fields() {
            let value = match field.read()? {
                Some(value) => value.to_string(),
                None => "(unset)".to_string(),
            };
            output.entry(field.name(), &value);
        }
    }
    println!();
    output.success(&format!(
        "{} matches {}",
        file.display(),
        schema_path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bind_failure_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        let ini = temp_dir.path().join("app.ini");
        let schema = temp_dir.path().join("schema.toml");
        fs::write(&ini, "[db]\nport = 5432\n").unwrap();
        fs::write(&schema, "[db.host]\n").unwrap();

        let err = run(&ini, &schema, ParserOptions::default(), OutputFormat::Json).unwrap_err();
        let err = err.downcast::<SchemaError>().unwrap();
        assert!(matches!(err, SchemaError::MissingField { .. }));
    }
}
