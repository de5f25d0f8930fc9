//! Parser Options (Figment-based)
//!
//! Options handed verbatim to the INI loader. Resolution chain:
//! 1. Built-in defaults (Serialized)
//! 2. Optional options file (TOML)
//! 3. Environment variables (INISCHEMA_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::debug;

use crate::types::{Result, SchemaError};

/// INI dialect knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Characters separating an option name from its value
    pub delimiters: Vec<char>,

    /// Prefixes marking a whole line as a comment
    pub comment_prefixes: Vec<String>,

    /// Prefixes (preceded by whitespace) that start a trailing comment
    pub inline_comment_prefixes: Vec<String>,

    /// Accept bare option names without a delimiter (value becomes empty)
    pub allow_no_value: bool,

    /// Reject duplicate sections and duplicate options within a section
    pub strict: bool,

    /// Lower-case option names on read and lookup
    pub lowercase_options: bool,

    /// Section whose options are visible from every other section
    pub default_section: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiters: vec!['=', ':'],
            comment_prefixes: vec!["#".to_string(), ";".to_string()],
            inline_comment_prefixes: Vec::new(),
            allow_no_value: false,
            strict: true,
            lowercase_options: true,
            default_section: "DEFAULT".to_string(),
        }
    }
}

impl ParserOptions {
    /// Load options with full resolution chain: defaults → file → env vars
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            debug!("Loading parser options from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // e.g. INISCHEMA_ALLOW_NO_VALUE=true -> allow_no_value
        figment = figment.merge(Env::prefixed("INISCHEMA_").lowercase(true));

        let options: Self = figment
            .extract()
            .map_err(|e| SchemaError::Options(e.to_string()))?;

        options.validate()?;
        Ok(options)
    }

    /// Validate option values are usable by the parser
    pub fn validate(&self) -> Result<()> {
        if self.delimiters.is_empty() {
            return Err(SchemaError::Options(
                "at least one delimiter is required".to_string(),
            ));
        }

        if let Some(c) = self.delimiters.iter().find(|c| **c == '[' || c.is_whitespace()) {
            return Err(SchemaError::Options(format!(
                "{:?} cannot be used as a delimiter",
                c
            )));
        }

        if self.comment_prefixes.iter().any(String::is_empty)
            || self.inline_comment_prefixes.iter().any(String::is_empty)
        {
            return Err(SchemaError::Options(
                "comment prefixes must not be empty".to_string(),
            ));
        }

        if self.default_section.trim().is_empty() {
            return Err(SchemaError::Options(
                "default_section must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply the option-name transform
    pub fn option_key(&self, option: &str) -> String {
        if self.lowercase_options {
            option.to_lowercase()
        } else {
            option.to_string()
        }
    }
}
