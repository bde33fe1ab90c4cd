//! Loose conversions between JSON kinds.
//!
//! Coercion is more permissive than the checked `as_*` accessors: booleans
//! widen to numbers, any value renders to a string, and numeric strings parse
//! back to numbers. Containers and null only coerce to themselves.

use super::{Kind, Value};
use crate::error::KindError;
use crate::parse_index::ParseIndex;

/// Whether a value of kind `from` can be coerced to kind `to` without
/// inspecting the payload. String-to-number coercion depends on the string
/// contents and reports `true` here; the conversion itself may still fail.
pub fn can_coerce(from: Kind, to: Kind) -> bool {
    match to {
        // object, array and null cannot be coerced to, so the kinds must match
        Kind::Null | Kind::Object | Kind::Array => from == to,
        Kind::String | Kind::Boolean => true,
        Kind::Integer | Kind::Decimal => {
            from == Kind::Integer || from == Kind::Decimal || from == Kind::String
        }
    }
}

pub fn coerce_null(from: &Value) -> Result<(), KindError> {
    if from.is_null() {
        Ok(())
    } else {
        Err(KindError::new(format!(
            "can only coerce null from a null, but from is of kind {}",
            from.kind()
        )))
    }
}

pub fn coerce_boolean(from: &Value) -> Result<bool, KindError> {
    match from {
        Value::Null => Ok(false),
        Value::Boolean(b) => Ok(*b),
        Value::Integer(n) => Ok(*n != 0),
        Value::Decimal(d) => Ok(*d != 0.0),
        Value::String(s) => Ok(!s.is_empty()),
        Value::Array(a) => Ok(!a.is_empty()),
        Value::Object(o) => Ok(!o.is_empty()),
    }
}

pub fn coerce_integer(from: &Value) -> Result<i64, KindError> {
    match from {
        Value::Boolean(b) => Ok(*b as i64),
        Value::Integer(n) => Ok(*n),
        // saturating cast; NaN becomes 0
        Value::Decimal(d) => Ok(*d as i64),
        Value::String(s) => match reparse_number(s) {
            Some(value) => coerce_integer(&value),
            None => Err(KindError::new(format!(
                "could not interpret string {:?} as an integer",
                s
            ))),
        },
        other => Err(KindError::new(format!(
            "invalid kind for integer: {}",
            other.kind()
        ))),
    }
}

pub fn coerce_decimal(from: &Value) -> Result<f64, KindError> {
    match from {
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Integer(n) => Ok(*n as f64),
        Value::Decimal(d) => Ok(*d),
        Value::String(s) => match reparse_number(s) {
            Some(value) => coerce_decimal(&value),
            None => Err(KindError::new(format!(
                "could not interpret string {:?} as a decimal",
                s
            ))),
        },
        other => Err(KindError::new(format!(
            "invalid kind for decimal: {}",
            other.kind()
        ))),
    }
}

/// The string payload for strings; every other kind renders through the
/// compact encoder.
pub fn coerce_string(from: &Value) -> String {
    match from {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn reparse_number(text: &str) -> Option<Value> {
    let index = ParseIndex::parse(text);
    if !index.success() {
        return None;
    }
    let value = index.extract_tree().ok()?;
    match value.kind() {
        Kind::Integer | Kind::Decimal | Kind::Null => Some(value),
        _ => None,
    }
}
