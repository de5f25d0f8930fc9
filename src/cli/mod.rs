pub mod commands;
pub mod ui;

pub use ui::Output;

/// Serialisation format for command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Toml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "toml" => Ok(OutputFormat::Toml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: text, toml, json",
                s
            )),
        }
    }
}

/// Render any serialisable value as TOML or pretty JSON
pub(crate) fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml | OutputFormat::Text => toml::to_string_pretty(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_json() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("a", 1);
        let out = render(&map, OutputFormat::Json).unwrap();
        assert!(out.contains("\"a\": 1"));
    }
}
