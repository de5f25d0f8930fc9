//! Field declarations and their per-instance binding state

use std::sync::Arc;

use tracing::debug;

use crate::store::{RawStore, coerce};
use crate::types::{FieldKind, FromValue, Result, SchemaError, Value};

// =============================================================================
// Declaration
// =============================================================================

/// Immutable declaration of one option: kind, default and policies
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    default: Option<Value>,
    required: bool,
    frozen: bool,
}

impl FieldSpec {
    /// Required, writable, no default
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            required: true,
            frozen: false,
        }
    }

    pub fn raw(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Raw)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Int)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// Value used verbatim when the option is absent
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Absent option resolves to no value instead of an error
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Reject writes once bound
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

// =============================================================================
// Binding State
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum FieldState {
    Unbound,
    /// `None` is the placeholder for an absent optional option
    Bound(Option<Value>),
}

/// One field's resolved value, owned by a single section instance
#[derive(Debug, Clone)]
pub struct Field {
    spec: Arc<FieldSpec>,
    section: Option<String>,
    option: String,
    state: FieldState,
}

impl Field {
    pub fn new(spec: Arc<FieldSpec>) -> Self {
        let option = spec.name.clone();
        Self {
            spec,
            section: None,
            option,
            state: FieldState::Unbound,
        }
    }

    /// Look up `(section, option)` and bind the coerced value, the default,
    /// or the absent placeholder. A missing required option or unparsable
    /// text leaves the field unbound.
    pub fn resolve(&mut self, store: &dyn RawStore, section: &str, option: &str) -> Result<()> {
        self.section = Some(section.to_string());
        self.option = option.to_string();

        let value = match store.get(section, option) {
            Ok(raw) => Some(
                coerce::coerce(self.spec.kind, raw)
                    .map_err(|e| SchemaError::coercion(section, option, e))?,
            ),
            Err(cause) => {
                if let Some(default) = &self.spec.default {
                    debug!("{}.{} absent, using default {}", section, option, default);
                    Some(default.clone())
                } else if self.spec.required {
                    return Err(SchemaError::missing_field(section, option, cause));
                } else {
                    None
                }
            }
        };

        self.state = FieldState::Bound(value);
        Ok(())
    }

    /// Resolved value; `Ok(None)` for an absent optional option
    pub fn read(&self) -> Result<Option<&Value>> {
        match &self.state {
            FieldState::Bound(value) => Ok(value.as_ref()),
            FieldState::Unbound => Err(SchemaError::Unbound {
                section: self.section.clone(),
                option: self.option.clone(),
            }),
        }
    }

    /// Resolved value converted to `T`
    pub fn get<T: FromValue>(&self) -> Result<T> {
        T::from_value(self.read()?).map_err(|e| SchemaError::TypeMismatch {
            section: self.section.clone().unwrap_or_default(),
            option: self.option.clone(),
            expected: e.expected,
            found: e.found,
        })
    }

    /// Replace the value after re-validating it against the field's kind.
    /// Frozen fields reject writes once bound and keep their prior value.
    pub fn write(&mut self, value: impl Into<Value>) -> Result<()> {
        let section = self.section.clone().unwrap_or_default();
        if self.spec.frozen && self.is_bound() {
            return Err(SchemaError::frozen_field(section, &self.option));
        }

        let value = coerce::normalize(self.spec.kind, value.into())
            .map_err(|e| SchemaError::coercion(section, &self.option, e))?;
        self.state = FieldState::Bound(Some(value));
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, FieldState::Bound(_))
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Section this field was last resolved against
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }
}
