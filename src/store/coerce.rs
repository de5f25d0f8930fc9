//! Coercion grammar shared by the raw store and schema fields
//!
//! Text is trimmed before parsing. Booleans accept the classic INI literals,
//! integers are decimal with optional sign and digit-separating underscores,
//! floats add fraction, exponent, `inf`, `infinity` and `nan`.

use crate::types::{CoercionError, FieldKind, Value};

const TRUE_LITERALS: &[&str] = &["1", "yes", "true", "on"];
const FALSE_LITERALS: &[&str] = &["0", "no", "false", "off"];

pub fn parse_bool(raw: &str) -> Result<bool, CoercionError> {
    let lower = raw.trim().to_lowercase();
    if TRUE_LITERALS.contains(&lower.as_str()) {
        Ok(true)
    } else if FALSE_LITERALS.contains(&lower.as_str()) {
        Ok(false)
    } else {
        Err(CoercionError::new(
            FieldKind::Bool,
            raw,
            "not a boolean (expected one of 1/yes/true/on or 0/no/false/off)",
        ))
    }
}

pub fn parse_int(raw: &str) -> Result<i64, CoercionError> {
    let text = strip_separators(raw.trim())
        .ok_or_else(|| CoercionError::new(FieldKind::Int, raw, "misplaced underscore"))?;

    let digits = text.strip_prefix(['+', '-']).unwrap_or(text.as_str());
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoercionError::new(
            FieldKind::Int,
            raw,
            "not a decimal integer",
        ));
    }

    text.parse::<i64>()
        .map_err(|_| CoercionError::new(FieldKind::Int, raw, "out of range for a 64-bit integer"))
}

pub fn parse_float(raw: &str) -> Result<f64, CoercionError> {
    let text = strip_separators(raw.trim())
        .ok_or_else(|| CoercionError::new(FieldKind::Float, raw, "misplaced underscore"))?;

    text.parse::<f64>()
        .map_err(|e| CoercionError::new(FieldKind::Float, raw, e.to_string()))
}

/// Apply the coercion rule for `kind` to raw option text
pub fn coerce(kind: FieldKind, raw: &str) -> Result<Value, CoercionError> {
    match kind {
        FieldKind::Raw => Ok(Value::Str(raw.to_string())),
        FieldKind::Bool => parse_bool(raw).map(Value::Bool),
        FieldKind::Int => parse_int(raw).map(Value::Int),
        FieldKind::Float => parse_float(raw).map(Value::Float),
    }
}

/// Re-validate an already-typed value against `kind`.
///
/// Strings go through the text grammar, ints widen to floats, everything else
/// must already be the right variant.
pub fn normalize(kind: FieldKind, value: Value) -> Result<Value, CoercionError> {
    match (kind, value) {
        (FieldKind::Raw, v @ Value::Str(_)) => Ok(v),
        (FieldKind::Bool, v @ Value::Bool(_)) => Ok(v),
        (FieldKind::Int, v @ Value::Int(_)) => Ok(v),
        (FieldKind::Float, v @ Value::Float(_)) => Ok(v),
        (FieldKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (kind, Value::Str(s)) => coerce(kind, &s),
        (kind, other) => Err(CoercionError::new(
            kind,
            other.to_string(),
            format!("a {} value cannot be stored in a {} field", other.type_name(), kind),
        )),
    }
}

/// Drop underscores that sit between two ASCII digits; `None` if any other underscore exists
fn strip_separators(text: &str) -> Option<String> {
    if !text.contains('_') {
        return Some(text.to_string());
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            let before = i.checked_sub(1).map(|j| chars[j].is_ascii_digit());
            let after = chars.get(i + 1).map(char::is_ascii_digit);
            if before != Some(true) || after != Some(true) {
                return None;
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}
