//! Section declarations and resolved section instances

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

use tracing::{debug, trace};

use super::field::{Field, FieldSpec};
use crate::store::RawStore;
use crate::types::{FromValue, Result, SchemaError, Value};

// =============================================================================
// Declaration
// =============================================================================

/// Ordered, immutable set of field declarations.
///
/// The same spec can be mounted under several section names; each mount
/// gets its own `Section` with independent field state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionSpec {
    fields: Vec<Arc<FieldSpec>>,
}

impl SectionSpec {
    pub fn builder() -> SectionSpecBuilder {
        SectionSpecBuilder::default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SectionSpecBuilder {
    fields: Vec<FieldSpec>,
}

impl SectionSpecBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn build(self) -> Result<SectionSpec> {
        for (i, spec) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name() == spec.name()) {
                return Err(SchemaError::DuplicateField(spec.name().to_string()));
            }
        }
        Ok(SectionSpec {
            fields: self.fields.into_iter().map(Arc::new).collect(),
        })
    }
}

// =============================================================================
// Resolved Section
// =============================================================================

/// A named group of fields bound against one section of a raw store
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    fields: Vec<Field>,
}

impl Section {
    /// Fresh, unbound fields for every declaration in `spec`
    pub fn new(name: impl Into<String>, spec: &SectionSpec) -> Self {
        Self {
            name: name.into(),
            fields: spec.fields.iter().cloned().map(Field::new).collect(),
        }
    }

    /// Bind every declared field against `store`.
    ///
    /// Options present in the store are visited first, in store order;
    /// undeclared ones are ignored. Remaining fields then resolve in
    /// declaration order so defaults and optional placeholders apply.
    /// The first failure is returned.
    pub fn resolve(&mut self, store: &dyn RawStore) -> Result<()> {
        let mut touched = vec![false; self.fields.len()];

        match store.options(&self.name) {
            Ok(present) => {
                for option in present {
                    match self.fields.iter().position(|f| f.name() == option) {
                        Some(i) => {
                            self.fields[i].resolve(store, &self.name, option)?;
                            touched[i] = true;
                        }
                        None => trace!("{}: ignoring undeclared option {}", self.name, option),
                    }
                }
            }
            Err(_) => debug!("Section {} not present in store", self.name),
        }

        for (field, done) in self.fields.iter_mut().zip(touched) {
            if !done {
                let option = field.name().to_string();
                field.resolve(store, &self.name, &option)?;
            }
        }

        debug!("Resolved section {} ({} fields)", self.name, self.fields.len());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, option: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.name() == option)
            .ok_or_else(|| self.unknown(option))
    }

    pub fn field_mut(&mut self, option: &str) -> Result<&mut Field> {
        match self.fields.iter().position(|f| f.name() == option) {
            Some(i) => Ok(&mut self.fields[i]),
            None => Err(self.unknown(option)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Typed read of a field's resolved value
    pub fn get<T: FromValue>(&self, option: &str) -> Result<T> {
        self.field(option)?.get()
    }

    /// Raw resolved value; `Ok(None)` for an absent optional option
    pub fn value(&self, option: &str) -> Result<Option<&Value>> {
        self.field(option)?.read()
    }

    /// Write through to the field, subject to its frozen policy
    pub fn set(&mut self, option: &str, value: impl Into<Value>) -> Result<()> {
        self.field_mut(option)?.write(value)
    }

    pub fn is_bound(&self) -> bool {
        self.fields.iter().all(Field::is_bound)
    }

    fn unknown(&self, option: &str) -> SchemaError {
        SchemaError::UnknownField {
            section: self.name.clone(),
            option: option.to_string(),
        }
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name(), &field.read().ok().flatten())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{IniStore, ParserOptions};

    fn store() -> IniStore {
        IniStore::parse(
            "[db]\nhost = localhost\nport = 5432\nssl = false\nextra = ignored\n",
            ParserOptions::default(),
        )
        .unwrap()
    }

    fn db_spec() -> SectionSpec {
        SectionSpec::builder()
            .field(FieldSpec::raw("host"))
            .field(FieldSpec::int("port"))
            .field(FieldSpec::bool("ssl").default(true))
            .field(FieldSpec::int("timeout").default(30))
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = SectionSpec::builder()
            .field(FieldSpec::raw("a"))
            .field(FieldSpec::int("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField(name) if name == "a"));
    }

    #[test]
    fn test_resolve_present_and_defaulted() {
        let mut section = Section::new("db", &db_spec());
        assert!(!section.is_bound());

        section.resolve(&store()).unwrap();
        assert!(section.is_bound());
        assert_eq!(section.get::<String>("host").unwrap(), "localhost");
        assert_eq!(section.get::<u16>("port").unwrap(), 5432);
        assert!(!section.get::<bool>("ssl").unwrap());
        assert_eq!(section.get::<i64>("timeout").unwrap(), 30);
    }

    #[test]
    fn test_undeclared_options_ignored() {
        let mut section = Section::new("db", &db_spec());
        section.resolve(&store()).unwrap();
        assert!(matches!(
            section.get::<String>("extra"),
            Err(SchemaError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_missing_section_reports_first_required_field() {
        let mut section = Section::new("cache", &db_spec());
        let err = section.resolve(&store()).unwrap_err();
        match err {
            SchemaError::MissingField {
                section,
                option,
                cause,
            } => {
                assert_eq!(section, "cache");
                assert_eq!(option, "host");
                assert!(cause.is_section_missing());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_raw_value_access() {
        let spec = SectionSpec::builder()
            .field(FieldSpec::raw("host"))
            .field(FieldSpec::int("pool").optional())
            .build()
            .unwrap();
        let mut section = Section::new("db", &spec);
        assert!(matches!(
            section.value("host"),
            Err(SchemaError::Unbound { .. })
        ));

        section.resolve(&store()).unwrap();
        assert_eq!(
            section.value("host").unwrap().and_then(Value::as_str),
            Some("localhost")
        );
        assert_eq!(section.value("pool").unwrap(), None);
        assert!(matches!(
            section.value("extra"),
            Err(SchemaError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_set_and_type_mismatch() {
        let mut section = Section::new("db", &db_spec());
        section.resolve(&store()).unwrap();

        section.set("port", 6543).unwrap();
        assert_eq!(section.get::<i64>("port").unwrap(), 6543);

        let err = section.get::<String>("port").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::TypeMismatch {
                expected: "string",
                ..
            }
        ));
        assert!(section.set("nope", 1).is_err());
    }

    #[test]
    fn test_instances_from_same_spec_are_independent() {
        let spec = db_spec();
        let store = store();
        let mut a = Section::new("db", &spec);
        let mut b = Section::new("db", &spec);
        a.resolve(&store).unwrap();
        b.resolve(&store).unwrap();

        a.set("host", "elsewhere").unwrap();
        assert_eq!(a.get::<String>("host").unwrap(), "elsewhere");
        assert_eq!(b.get::<String>("host").unwrap(), "localhost");
    }

    #[test]
    fn test_serialize_values() {
        let mut section = Section::new("db", &db_spec());
        section.resolve(&store()).unwrap();
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["port"], 5432);
        assert_eq!(json["ssl"], false);
        assert_eq!(json["host"], "localhost");
    }
}
