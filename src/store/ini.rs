//! Classic INI store
//!
//! `[section]` headers, `name = value` / `name: value` lines, full-line
//! comments, indented continuation lines and a defaults section whose
//! options show through every other section. Values are kept verbatim;
//! there is no interpolation.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use super::RawStore;
use super::options::ParserOptions;
use crate::types::{LookupError, StoreError};

/// Insertion-ordered option list of one section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entries(Vec<(String, String)>);

impl Entries {
    fn position(&self, key: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k == key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.0[i].1.as_str())
    }

    /// Insert or overwrite, returning the slot index
    fn insert(&mut self, key: String, value: String) -> usize {
        match self.position(&key) {
            Some(i) => {
                self.0[i].1 = value;
                i
            }
            None => {
                self.0.push((key, value));
                self.0.len() - 1
            }
        }
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Defaults,
    Section(usize),
}

/// An INI document materialised as section → option → string
#[derive(Debug, Clone)]
pub struct IniStore {
    options: ParserOptions,
    defaults: Entries,
    sections: Vec<(String, Entries)>,
}

impl Default for IniStore {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl IniStore {
    /// Empty store using the given dialect
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            defaults: Entries::default(),
            sections: Vec::new(),
        }
    }

    /// Read and parse an INI file.
    ///
    /// A file that does not exist loads as an empty store; any other read
    /// failure is an error.
    pub fn load(path: &Path, options: ParserOptions) -> Result<Self, StoreError> {
        info!("Loading config from: {}", path.display());
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Config file not found, using empty store: {}", path.display());
                return Ok(Self::new(options));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse_named(&text, &path.display().to_string(), options)
    }

    /// Parse INI text held in memory
    pub fn parse(text: &str, options: ParserOptions) -> Result<Self, StoreError> {
        Self::parse_named(text, "<string>", options)
    }

    /// Build a store from a TOML document: top-level tables become sections,
    /// top-level scalars land in the defaults section.
    pub fn from_toml_str(text: &str, options: ParserOptions) -> Result<Self, StoreError> {
        let table: toml::Table = toml::from_str(text)?;
        let mut store = Self::new(options);

        for (name, item) in table {
            match item {
                toml::Value::Table(inner) => {
                    let target = store.target_for_header(&name);
                    for (option, value) in inner {
                        let text = toml_scalar(&name, &option, value)?;
                        let key = store.options.option_key(&option);
                        store.entries_mut(target).insert(key, text);
                    }
                }
                scalar => {
                    let section = store.options.default_section.clone();
                    let text = toml_scalar(&section, &name, scalar)?;
                    let key = store.options.option_key(&name);
                    store.defaults.insert(key, text);
                }
            }
        }

        Ok(store)
    }

    pub fn parser_options(&self) -> &ParserOptions {
        &self.options
    }

    /// Add an empty section; returns false when it already exists
    pub fn add_section(&mut self, name: &str) -> bool {
        if name == self.options.default_section || self.section_index(name).is_some() {
            return false;
        }
        self.sections.push((name.to_string(), Entries::default()));
        true
    }

    /// Set an option in an existing section (or the defaults section)
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
    ) -> Result<(), LookupError> {
        let target = if section == self.options.default_section {
            Target::Defaults
        } else {
            Target::Section(
                self.section_index(section)
                    .ok_or_else(|| LookupError::no_section(section))?,
            )
        };
        let key = self.options.option_key(option);
        self.entries_mut(target).insert(key, value.into());
        Ok(())
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    fn parse_named(text: &str, source_name: &str, options: ParserOptions) -> Result<Self, StoreError> {
        let mut store = Self::new(options);
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut target: Option<Target> = None;
        // (option slot, indentation of the line that opened it)
        let mut current: Option<(usize, usize)> = None;
        let mut pending_blank = 0usize;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let parse_error = |message: &str| StoreError::Parse {
                source_name: source_name.to_string(),
                line: line_no,
                message: message.to_string(),
            };

            let Some(line) = store.strip_comments(raw_line) else {
                continue;
            };
            if line.trim().is_empty() {
                if current.is_some() {
                    pending_blank += 1;
                }
                continue;
            }

            let content = line.trim();
            let indent = line.len() - line.trim_start().len();

            if let (Some(t), Some((slot, opened_at))) = (target, current)
                && indent > opened_at
            {
                let value = &mut store.entries_mut(t).0[slot].1;
                for _ in 0..pending_blank {
                    value.push('\n');
                }
                value.push('\n');
                value.push_str(content);
                pending_blank = 0;
                continue;
            }
            pending_blank = 0;
            current = None;

            // Anything after the closing bracket is ignored
            if let Some(rest) = content.strip_prefix('[')
                && let Some(close) = rest.rfind(']')
            {
                let name = &rest[..close];
                if name.is_empty() {
                    return Err(parse_error("empty section header"));
                }
                if store.options.strict && store.section_index(name).is_some() {
                    return Err(StoreError::DuplicateSection {
                        source_name: source_name.to_string(),
                        section: name.to_string(),
                        line: line_no,
                    });
                }
                target = Some(store.target_for_header(name));
                continue;
            }

            let Some(t) = target else {
                return Err(parse_error("file contains no section headers"));
            };

            let (name, value) = match content
                .char_indices()
                .find(|(_, c)| store.options.delimiters.contains(c))
            {
                Some((i, c)) => (content[..i].trim(), content[i + c.len_utf8()..].trim()),
                None if store.options.allow_no_value => (content, ""),
                None => return Err(parse_error("expected 'name = value', no delimiter found")),
            };
            if name.is_empty() {
                return Err(parse_error("option name is empty"));
            }

            let key = store.options.option_key(name);
            if store.options.strict && store.entries(t).position(&key).is_some() {
                return Err(StoreError::DuplicateOption {
                    source_name: source_name.to_string(),
                    section: store.target_name(t).to_string(),
                    option: key,
                    line: line_no,
                });
            }
            let slot = store.entries_mut(t).insert(key, value.to_string());
            current = Some((slot, indent));
        }

        debug!(
            "Parsed {} sections from {}",
            store.sections.len(),
            source_name
        );
        Ok(store)
    }

    /// `None` for full-line comments, otherwise the line with any inline comment cut off
    fn strip_comments<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        if self
            .options
            .comment_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p.as_str()))
        {
            return None;
        }

        if self.options.inline_comment_prefixes.is_empty() {
            return Some(line);
        }

        let mut prev: Option<char> = None;
        for (i, c) in line.char_indices() {
            if prev.is_some_and(char::is_whitespace)
                && self
                    .options
                    .inline_comment_prefixes
                    .iter()
                    .any(|p| line[i..].starts_with(p.as_str()))
            {
                return Some(&line[..i]);
            }
            prev = Some(c);
        }
        Some(line)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|(n, _)| n == name)
    }

    /// Resolve a header to its target, creating the section on first sight
    fn target_for_header(&mut self, name: &str) -> Target {
        if name == self.options.default_section {
            return Target::Defaults;
        }
        match self.section_index(name) {
            Some(i) => Target::Section(i),
            None => {
                self.sections.push((name.to_string(), Entries::default()));
                Target::Section(self.sections.len() - 1)
            }
        }
    }

    fn target_name(&self, target: Target) -> &str {
        match target {
            Target::Defaults => &self.options.default_section,
            Target::Section(i) => &self.sections[i].0,
        }
    }

    fn entries(&self, target: Target) -> &Entries {
        match target {
            Target::Defaults => &self.defaults,
            Target::Section(i) => &self.sections[i].1,
        }
    }

    fn entries_mut(&mut self, target: Target) -> &mut Entries {
        match target {
            Target::Defaults => &mut self.defaults,
            Target::Section(i) => &mut self.sections[i].1,
        }
    }
}

fn toml_scalar(section: &str, option: &str, value: toml::Value) -> Result<String, StoreError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(x) => Ok(x.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        other => Err(StoreError::UnsupportedToml {
            section: section.to_string(),
            option: option.to_string(),
            found: other.type_str().to_string(),
        }),
    }
}

impl RawStore for IniStore {
    fn get(&self, section: &str, option: &str) -> Result<&str, LookupError> {
        let key = self.options.option_key(option);
        let entries = if section == self.options.default_section {
            &self.defaults
        } else {
            let i = self
                .section_index(section)
                .ok_or_else(|| LookupError::no_section(section))?;
            &self.sections[i].1
        };

        entries
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .ok_or_else(|| LookupError::no_option(section, option))
    }

    fn options(&self, section: &str) -> Result<Vec<&str>, LookupError> {
        let i = self
            .section_index(section)
            .ok_or_else(|| LookupError::no_section(section))?;
        let own = &self.sections[i].1;

        let mut names: Vec<&str> = own.keys().collect();
        names.extend(self.defaults.keys().filter(|k| own.position(k).is_none()));
        Ok(names)
    }

    fn has_section(&self, section: &str) -> bool {
        self.section_index(section).is_some()
    }

    fn sections(&self) -> Vec<&str> {
        self.sections.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Serialize for IniStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_defaults = !self.defaults.is_empty();
        let len = self.sections.len() + usize::from(has_defaults);
        let mut map = serializer.serialize_map(Some(len))?;
        if has_defaults {
            map.serialize_entry(&self.options.default_section, &self.defaults)?;
        }
        for (name, entries) in &self.sections {
            map.serialize_entry(name, entries)?;
        }
        map.end()
    }
}
