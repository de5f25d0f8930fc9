//! Field kinds and resolved values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coercion rule a field applies to its raw option text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Pass-through string
    #[default]
    Raw,
    Bool,
    Int,
    Float,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Raw => write!(f, "raw"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int => write!(f, "int"),
            FieldKind::Float => write!(f, "float"),
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "str" | "string" => Ok(FieldKind::Raw),
            "bool" | "boolean" => Ok(FieldKind::Bool),
            "int" | "integer" => Ok(FieldKind::Int),
            "float" => Ok(FieldKind::Float),
            _ => Err(format!(
                "Invalid kind '{}'. Valid values: raw, bool, int, float",
                s
            )),
        }
    }
}

/// A resolved, typed option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Short type name used in mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
        }
    }

    /// The kind whose coercion rule produces this variant
    pub fn kind(&self) -> FieldKind {
        match self {
            Value::Str(_) => FieldKind::Raw,
            Value::Bool(_) => FieldKind::Bool,
            Value::Int(_) => FieldKind::Int,
            Value::Float(_) => FieldKind::Float,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

// =============================================================================
// Typed Extraction
// =============================================================================

/// Why a resolved value could not be read as the requested Rust type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    pub expected: &'static str,
    pub found: String,
}

impl ExtractError {
    fn new(expected: &'static str, found: Option<&Value>) -> Self {
        let found = match found {
            Some(v) => v.type_name().to_string(),
            None => "no value".to_string(),
        };
        Self { expected, found }
    }
}

/// Conversion from a resolved field value (possibly absent) into a Rust type
pub trait FromValue: Sized {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError>;
}

impl FromValue for Value {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
        value.cloned().ok_or_else(|| ExtractError::new("value", None))
    }
}

impl FromValue for String {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
        match value {
            Some(Value::Str(s)) => Ok(s.clone()),
            other => Err(ExtractError::new("string", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
        match value {
            Some(Value::Bool(b)) => Ok(*b),
            other => Err(ExtractError::new("bool", other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
        match value {
            Some(Value::Float(x)) => Ok(*x),
            Some(Value::Int(i)) => Ok(*i as f64),
            other => Err(ExtractError::new("float", other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
                    match value {
                        Some(Value::Int(i)) => <$ty>::try_from(*i).map_err(|_| ExtractError {
                            expected: stringify!($ty),
                            found: format!("out-of-range int {}", i),
                        }),
                        other => Err(ExtractError::new(stringify!($ty), other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i64, i32, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Option<&Value>) -> Result<Self, ExtractError> {
        match value {
            None => Ok(None),
            some => T::from_value(some).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("INT".parse::<FieldKind>().unwrap(), FieldKind::Int);
        assert_eq!("boolean".parse::<FieldKind>().unwrap(), FieldKind::Bool);
        assert!("list".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_value_kind_and_str_view() {
        assert_eq!(Value::from("x").kind(), FieldKind::Raw);
        assert_eq!(Value::from(true).kind(), FieldKind::Bool);
        assert_eq!(Value::from(7).kind(), FieldKind::Int);
        assert_eq!(Value::from(0.5).kind(), FieldKind::Float);

        assert_eq!(Value::from("localhost").as_str(), Some("localhost"));
        assert_eq!(Value::Int(1).as_str(), None);
    }

    #[test]
    fn test_extract_matching_types() {
        let v = Value::Int(5432);
        assert_eq!(i64::from_value(Some(&v)).unwrap(), 5432);
        assert_eq!(u16::from_value(Some(&v)).unwrap(), 5432);
        assert_eq!(f64::from_value(Some(&v)).unwrap(), 5432.0);
    }

    #[test]
    fn test_extract_out_of_range() {
        let err = u16::from_value(Some(&Value::Int(70_000))).unwrap_err();
        assert_eq!(err.expected, "u16");
        assert!(err.found.contains("70000"));
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(Option::<String>::from_value(None).unwrap(), None);
        let err = String::from_value(None).unwrap_err();
        assert_eq!(err.found, "no value");
    }

    #[test]
    fn test_extract_mismatch() {
        let err = bool::from_value(Some(&Value::from("yes"))).unwrap_err();
        assert_eq!(err.expected, "bool");
        assert_eq!(err.found, "string");
    }
}
