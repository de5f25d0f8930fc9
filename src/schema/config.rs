//! Schema root and the bound configuration
//!
//! A `Schema` is the shared, immutable declaration. Every `Config` built
//! from it gets freshly created sections and fields, so instances never
//! observe each other's writes.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::section::{Section, SectionSpec};
use crate::store::{IniStore, ParserOptions, RawStore};
use crate::types::{FromValue, Result, SchemaError, Value};

// =============================================================================
// Schema
// =============================================================================

/// Ordered section declarations; cheap to clone
#[derive(Debug, Clone, Default)]
pub struct Schema {
    sections: Arc<Vec<(String, Arc<SectionSpec>)>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declared `(section name, spec)` pairs in declaration order
    pub fn sections(&self) -> impl Iterator<Item = (&str, &SectionSpec)> {
        self.sections
            .iter()
            .map(|(name, spec)| (name.as_str(), spec.as_ref()))
    }

    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec.as_ref())
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    sections: Vec<(String, Arc<SectionSpec>)>,
}

impl SchemaBuilder {
    /// Mount `spec` under `name`; the same spec may be mounted repeatedly
    pub fn section(mut self, name: impl Into<String>, spec: impl Into<Arc<SectionSpec>>) -> Self {
        self.sections.push((name.into(), spec.into()));
        self
    }

    pub fn build(self) -> Result<Schema> {
        for (i, (name, _)) in self.sections.iter().enumerate() {
            if self.sections[..i].iter().any(|(n, _)| n == name) {
                return Err(SchemaError::DuplicateSection(name.clone()));
            }
        }
        Ok(Schema {
            sections: Arc::new(self.sections),
        })
    }
}

// =============================================================================
// Config
// =============================================================================

/// Where a `Config` takes its raw store from
pub struct ConfigBuilder<'a> {
    schema: &'a Schema,
    path: Option<PathBuf>,
    store: Option<&'a dyn RawStore>,
    parser_options: ParserOptions,
}

impl<'a> ConfigBuilder<'a> {
    /// Load an INI file; takes precedence over `store`
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use an already-loaded store
    pub fn store(mut self, store: &'a dyn RawStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Dialect passed to the INI loader when a path is given
    pub fn parser_options(mut self, options: ParserOptions) -> Self {
        self.parser_options = options;
        self
    }

    pub fn build(self) -> Result<Config> {
        let loaded: IniStore;
        let store: &dyn RawStore = match (self.path, self.store) {
            (Some(path), _) => {
                self.parser_options.validate()?;
                loaded = IniStore::load(&path, self.parser_options)?;
                &loaded
            }
            (None, Some(store)) => store,
            (None, None) => return Err(SchemaError::NoConfig),
        };

        Config::resolve(self.schema, store)
    }
}

/// A schema bound to one raw store
#[derive(Debug, Clone)]
pub struct Config {
    sections: Vec<Section>,
}

impl Config {
    pub fn builder(schema: &Schema) -> ConfigBuilder<'_> {
        ConfigBuilder {
            schema,
            path: None,
            store: None,
            parser_options: ParserOptions::default(),
        }
    }

    pub fn from_path(schema: &Schema, path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(schema).path(path).build()
    }

    pub fn from_store(schema: &Schema, store: &dyn RawStore) -> Result<Self> {
        Self::builder(schema).store(store).build()
    }

    /// Resolve every declared section; all-or-nothing
    fn resolve(schema: &Schema, store: &dyn RawStore) -> Result<Self> {
        let mut sections = Vec::new();
        for (name, spec) in schema.sections() {
            let mut section = Section::new(name, spec);
            section.resolve(store)?;
            sections.push(section);
        }

        debug!("Config bound ({} sections)", sections.len());
        Ok(Self { sections })
    }

    pub fn section(&self, name: &str) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SchemaError::UnknownSection(name.to_string()))
    }

    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| SchemaError::UnknownSection(name.to_string()))
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn get<T: FromValue>(&self, section: &str, option: &str) -> Result<T> {
        self.section(section)?.get(option)
    }

    pub fn set(&mut self, section: &str, option: &str, value: impl Into<Value>) -> Result<()> {
        self.section_mut(section)?.set(option, value)
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(section.name(), section)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::types::StoreError;
    use std::fs;
    use tempfile::TempDir;

    const TEST_CONFIG: &str = r#"
[section_1]
string_option = string value
bool_option = yes
int_option = 10
float_option = 1.5

[section_2]
option = value

[section_3]
string_option = third
"#;

    fn test_config() -> IniStore {
        IniStore::parse(TEST_CONFIG, ParserOptions::default()).unwrap()
    }

    fn full_schema() -> Schema {
        let section_1 = SectionSpec::builder()
            .field(FieldSpec::raw("string_option"))
            .field(FieldSpec::bool("bool_option"))
            .field(FieldSpec::int("int_option"))
            .field(FieldSpec::float("float_option"))
            .build()
            .unwrap();
        let section_2 = SectionSpec::builder()
            .field(FieldSpec::raw("option"))
            .build()
            .unwrap();

        Schema::builder()
            .section("section_1", section_1)
            .section("section_2", section_2)
            .build()
            .unwrap()
    }

    fn single_field_schema(field: FieldSpec) -> Schema {
        let section = SectionSpec::builder().field(field).build().unwrap();
        Schema::builder().section("section_1", section).build().unwrap()
    }

    fn assert_full_schema(cfg: &Config, store: &IniStore) {
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            store.get("section_1", "string_option").unwrap()
        );
        assert_eq!(
            cfg.get::<bool>("section_1", "bool_option").unwrap(),
            store.get_bool("section_1", "bool_option").unwrap()
        );
        assert_eq!(
            cfg.get::<i64>("section_1", "int_option").unwrap(),
            store.get_int("section_1", "int_option").unwrap()
        );
        assert_eq!(
            cfg.get::<f64>("section_1", "float_option").unwrap(),
            store.get_float("section_1", "float_option").unwrap()
        );
        assert_eq!(
            cfg.get::<String>("section_2", "option").unwrap(),
            store.get("section_2", "option").unwrap()
        );
    }

    #[test]
    fn test_no_config_defined() {
        let err = Config::builder(&full_schema()).build().unwrap_err();
        assert!(matches!(err, SchemaError::NoConfig));
        assert_eq!(
            err.to_string(),
            "No path to config or prepared config specified."
        );
    }

    #[test]
    fn test_read_config() {
        let store = test_config();
        let cfg = Config::from_store(&full_schema(), &store).unwrap();
        assert_full_schema(&cfg, &store);
    }

    #[test]
    fn test_read_config_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_config.ini");
        fs::write(&path, TEST_CONFIG).unwrap();

        let cfg = Config::from_path(&full_schema(), &path).unwrap();
        assert_full_schema(&cfg, &test_config());
    }

    #[test]
    fn test_path_wins_over_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("override.ini");
        fs::write(&path, "[section_1]\nstring_option = from file\n").unwrap();

        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let store = test_config();
        let cfg = Config::builder(&schema)
            .store(&store)
            .path(&path)
            .build()
            .unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            "from file"
        );
    }

    #[test]
    fn test_parser_options_passthrough() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("colon.ini");
        fs::write(&path, "[section_1]\nstring_option > arrow\n").unwrap();

        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let err = Config::from_path(&schema, &path).unwrap_err();
        assert!(matches!(err, SchemaError::Store(_)));

        let options = ParserOptions {
            delimiters: vec!['>'],
            ..ParserOptions::default()
        };
        let cfg = Config::builder(&schema)
            .path(&path)
            .parser_options(options)
            .build()
            .unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            "arrow"
        );
    }

    #[test]
    fn test_missing_file_binds_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let absent = temp_dir.path().join("absent.ini");

        let section = SectionSpec::builder()
            .field(FieldSpec::int("timeout").default(30))
            .field(FieldSpec::raw("label").optional())
            .build()
            .unwrap();
        let schema = Schema::builder().section("section_1", section).build().unwrap();
        let cfg = Config::from_path(&schema, &absent).unwrap();
        assert_eq!(cfg.get::<i64>("section_1", "timeout").unwrap(), 30);
        assert_eq!(cfg.get::<Option<String>>("section_1", "label").unwrap(), None);

        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let err = Config::from_path(&schema, &absent).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { .. }));
    }

    #[test]
    fn test_unreadable_path_is_store_error() {
        let temp_dir = TempDir::new().unwrap();
        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let err = Config::from_path(&schema, temp_dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::Store(StoreError::Io { .. })));
    }

    #[test]
    fn test_read_config_assign_new_value() {
        let store = test_config();
        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let mut cfg = Config::from_store(&schema, &store).unwrap();

        cfg.set("section_1", "string_option", "new_value").unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            "new_value"
        );
    }

    #[test]
    fn test_read_config_frozen_option() {
        let store = test_config();
        let schema = single_field_schema(FieldSpec::raw("string_option").frozen());
        let mut cfg = Config::from_store(&schema, &store).unwrap();

        let err = cfg
            .set("section_1", "string_option", "new value")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot set frozen field \"string_option\" in section \"section_1\""
        );
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            "string value"
        );
    }

    #[test]
    fn test_read_config_unspecified_option_with_default() {
        let section = SectionSpec::builder()
            .field(FieldSpec::raw("unspecified_option").default("default_value"))
            .field(FieldSpec::int("unspecified_option_2").default(10))
            .build()
            .unwrap();
        let schema = Schema::builder().section("section_1", section).build().unwrap();

        let cfg = Config::from_store(&schema, &test_config()).unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "unspecified_option").unwrap(),
            "default_value"
        );
        assert_eq!(
            cfg.get::<i64>("section_1", "unspecified_option_2").unwrap(),
            10
        );
    }

    #[test]
    fn test_read_config_unspecified_option() {
        let section = SectionSpec::builder()
            .field(FieldSpec::raw("unspecified_option"))
            .field(FieldSpec::int("unspecified_option_2"))
            .build()
            .unwrap();
        let schema = Schema::builder().section("section_1", section).build().unwrap();

        let err = Config::from_store(&schema, &test_config()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Option \"unspecified_option\" in section \"section_1\" is required."
        );
    }

    #[test]
    fn test_coercion_error_aborts_construction() {
        let schema = single_field_schema(FieldSpec::int("string_option"));
        let err = Config::from_store(&schema, &test_config()).unwrap_err();
        assert!(matches!(err, SchemaError::Coercion { .. }));
    }

    #[test]
    fn test_allow_multiple_instances() {
        let store = test_config();
        let schema = single_field_schema(FieldSpec::raw("string_option"));
        let mut instance_1 = Config::from_store(&schema, &store).unwrap();
        let instance_2 = Config::from_store(&schema, &store).unwrap();

        assert_eq!(
            instance_1.get::<String>("section_1", "string_option").unwrap(),
            instance_2.get::<String>("section_1", "string_option").unwrap()
        );

        instance_1
            .set("section_1", "string_option", "changed")
            .unwrap();
        assert_eq!(
            instance_2.get::<String>("section_1", "string_option").unwrap(),
            "string value"
        );
        assert!(schema.section("section_1").is_some());
    }

    #[test]
    fn test_reuse_sections() {
        let custom = Arc::new(
            SectionSpec::builder()
                .field(FieldSpec::raw("string_option"))
                .build()
                .unwrap(),
        );
        let schema = Schema::builder()
            .section("section_1", Arc::clone(&custom))
            .section("section_3", custom)
            .build()
            .unwrap();

        let store = test_config();
        let mut cfg = Config::from_store(&schema, &store).unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            store.get("section_1", "string_option").unwrap()
        );
        assert_eq!(
            cfg.get::<String>("section_3", "string_option").unwrap(),
            "third"
        );

        cfg.set("section_3", "string_option", "x").unwrap();
        assert_eq!(
            cfg.get::<String>("section_1", "string_option").unwrap(),
            "string value"
        );
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let spec = SectionSpec::default();
        let err = Schema::builder()
            .section("a", spec.clone())
            .section("a", spec)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSection(_)));
    }

    #[test]
    fn test_db_scenario() {
        let store = IniStore::parse(
            "[db]\nhost=localhost\nport=5432\nssl=false\n",
            ParserOptions::default(),
        )
        .unwrap();
        let db = SectionSpec::builder()
            .field(FieldSpec::raw("host"))
            .field(FieldSpec::int("port"))
            .field(FieldSpec::bool("ssl").default(true))
            .field(FieldSpec::int("timeout").default(30))
            .build()
            .unwrap();
        let schema = Schema::builder().section("db", db).build().unwrap();

        let cfg = Config::from_store(&schema, &store).unwrap();
        let section = cfg.section("db").unwrap();
        assert_eq!(section.get::<String>("host").unwrap(), "localhost");
        assert_eq!(section.get::<i64>("port").unwrap(), 5432);
        assert!(!section.get::<bool>("ssl").unwrap());
        assert_eq!(section.get::<i64>("timeout").unwrap(), 30);

        let empty = IniStore::default();
        match Config::from_store(&schema, &empty).unwrap_err() {
            SchemaError::MissingField {
                section, option, ..
            } => {
                assert_eq!(section, "db");
                assert_eq!(option, "host");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_section() {
        let cfg = Config::from_store(&full_schema(), &test_config()).unwrap();
        assert!(matches!(
            cfg.section("nope"),
            Err(SchemaError::UnknownSection(_))
        ));
        assert_eq!(cfg.sections().count(), 2);
    }
}
