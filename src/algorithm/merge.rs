use crate::error::{Error, KindError};
use crate::path::Path;
use crate::value::{coerce, Kind, Value};

/// Strategy hooks consulted by [merge] when both sides hold the same object
/// key or when kinds conflict outright.
pub trait MergeRules {
    /// Resolve `a` and `b` both present at object key `path`.
    fn resolve_same_key(&self, path: Path, a: Value, b: Value) -> Result<Value, Error>;

    /// Resolve a kind conflict at `path`. Integer/decimal pairs never reach
    /// this hook; they merge as decimals.
    fn resolve_type_conflict(&self, path: Path, a: Value, b: Value) -> Result<Value, Error>;
}

/// Rules which refuse to merge anything ambiguous.
pub struct ThrowingMergeRules;

impl MergeRules for ThrowingMergeRules {
    fn resolve_same_key(&self, path: Path, _: Value, _: Value) -> Result<Value, Error> {
        Err(Error::InvalidState(format!(
            "cannot merge duplicate key at \"{}\"",
            path
        )))
    }

    fn resolve_type_conflict(&self, path: Path, a: Value, b: Value) -> Result<Value, Error> {
        Err(KindError::new(format!(
            "found different types at path `{}': {} and {}",
            path,
            a.kind(),
            b.kind()
        ))
        .into())
    }
}

/// Rules which recurse into matching containers and coerce kind conflicts:
/// a null side yields the other side, anything else merges as the
/// concatenation of the two string coercions.
pub struct RecursiveMergeRules;

impl MergeRules for RecursiveMergeRules {
    fn resolve_same_key(&self, path: Path, a: Value, b: Value) -> Result<Value, Error> {
        merge_explicit(self, path, a, b)
    }

    fn resolve_type_conflict(&self, _: Path, a: Value, b: Value) -> Result<Value, Error> {
        Ok(coerce_merge(a, b))
    }
}

fn coerce_merge(a: Value, b: Value) -> Value {
    if a.is_null() {
        b
    } else if b.is_null() {
        a
    } else {
        let mut out = coerce::coerce_string(&a);
        out.push_str(&coerce::coerce_string(&b));
        Value::String(out)
    }
}

type MergeHook = Box<dyn Fn(Path, Value, Value) -> Result<Value, Error>>;

/// Rules with user-supplied closures per hook.
pub struct DynamicMergeRules {
    same_key: MergeHook,
    type_conflict: MergeHook,
}

impl DynamicMergeRules {
    pub fn new<S, T>(same_key: S, type_conflict: T) -> Self
    where
        S: Fn(Path, Value, Value) -> Result<Value, Error> + 'static,
        T: Fn(Path, Value, Value) -> Result<Value, Error> + 'static,
    {
        Self {
            same_key: Box::new(same_key),
            type_conflict: Box::new(type_conflict),
        }
    }
}

impl MergeRules for DynamicMergeRules {
    fn resolve_same_key(&self, path: Path, a: Value, b: Value) -> Result<Value, Error> {
        (self.same_key)(path, a, b)
    }

    fn resolve_type_conflict(&self, path: Path, a: Value, b: Value) -> Result<Value, Error> {
        (self.type_conflict)(path, a, b)
    }
}

/// Merge `a` and `b` at `path` under `rules`.
///
/// Matching kinds combine: objects union (shared keys through
/// `resolve_same_key` with the extended path), arrays concatenate, booleans
/// OR, numbers add, strings concatenate, nulls stay null. An
/// integer/decimal pair counts as matching and adds as a decimal; any other
/// kind pairing goes through `resolve_type_conflict`.
pub fn merge_explicit(
    rules: &dyn MergeRules,
    path: Path,
    a: Value,
    b: Value,
) -> Result<Value, Error> {
    let numeric = |value: &Value| matches!(value.kind(), Kind::Integer | Kind::Decimal);
    if a.kind() != b.kind() && !(numeric(&a) && numeric(&b)) {
        return rules.resolve_type_conflict(path, a, b);
    }

    match (a, b) {
        (Value::Object(a_members), Value::Object(b_members)) => {
            let mut out = a_members;
            for (key, b_member) in b_members {
                match out.remove(&key) {
                    None => {
                        out.insert(key, b_member);
                    }
                    Some(a_member) => {
                        let merged = rules.resolve_same_key(
                            path.child(key.as_str()),
                            a_member,
                            b_member,
                        )?;
                        out.insert(key, merged);
                    }
                }
            }
            Ok(Value::Object(out))
        }
        (Value::Array(a_items), Value::Array(b_items)) => {
            let mut out = a_items;
            out.extend(b_items);
            Ok(Value::Array(out))
        }
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a || b)),
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a + b)),
        (Value::String(mut a), Value::String(b)) => {
            a.push_str(&b);
            Ok(Value::String(a))
        }
        (Value::Null, Value::Null) => Ok(Value::Null),
        // integer/decimal in any combination adds as a decimal
        (a, b) => {
            let sum = a.as_decimal()? + b.as_decimal()?;
            Ok(Value::Decimal(sum))
        }
    }
}

/// Fold any number of values together under `rules`. No input yields an
/// empty object and a single input is returned unchanged, so `merge` is an
/// identity for one-element sequences.
pub fn merge(
    rules: &dyn MergeRules,
    values: impl IntoIterator<Item = Value>,
) -> Result<Value, Error> {
    let mut iter = values.into_iter();
    let mut out = match iter.next() {
        None => return Ok(Value::object()),
        Some(first) => first,
    };
    for next in iter {
        out = merge_explicit(rules, Path::new(), out, next)?;
    }
    Ok(out)
}
