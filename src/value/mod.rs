mod array;
pub mod coerce;
mod object;
mod print;

use crate::error::{Error, KindError, NoSuchElement, RangeError};
use crate::path::{Path, PathElement};
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The seven JSON kinds. The declaration order is the first tier of the
/// total order defined by [Value::cmp].
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Decimal,
    String,
    Array,
    Object,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Null => write!(f, "null"),
            Kind::Boolean => write!(f, "boolean"),
            Kind::Integer => write!(f, "integer"),
            Kind::Decimal => write!(f, "decimal"),
            Kind::String => write!(f, "string"),
            Kind::Array => write!(f, "array"),
            Kind::Object => write!(f, "object"),
        }
    }
}

/// An ordered sequence of values with random access by index and amortized
/// O(1) push at either end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Array {
    items: VecDeque<Value>,
}

/// An ordered mapping from string keys to values. Keys are unique and kept in
/// byte-lexicographic order; lookup, insert and erase are O(log n) and
/// iteration yields keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Object {
    entries: BTreeMap<String, Value>,
}

/// A JSON value: a discriminated union over the seven [Kind]s.
///
/// A value owns its payload exclusively; [Clone] deep-clones and
/// [take](Value::take) moves the payload out leaving `Null` behind.
/// Sub-values borrowed through the accessors live as long as the parent.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    /// An empty array value.
    pub fn array() -> Value {
        Value::Array(Array::new())
    }

    /// An empty object value.
    pub fn object() -> Value {
        Value::Object(Object::new())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::Integer(_) => Kind::Integer,
            Value::Decimal(_) => Kind::Decimal,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Move the payload out, leaving this value `Null`.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    pub fn as_boolean(&self) -> Result<bool, KindError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(mismatch(Kind::Boolean, other.kind())),
        }
    }

    pub fn as_integer(&self) -> Result<i64, KindError> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(mismatch(Kind::Integer, other.kind())),
        }
    }

    /// The numeric payload widened to a decimal. Accepts both `Integer` and
    /// `Decimal` values.
    pub fn as_decimal(&self) -> Result<f64, KindError> {
        match self {
            Value::Decimal(d) => Ok(*d),
            Value::Integer(n) => Ok(*n as f64),
            other => Err(mismatch(Kind::Decimal, other.kind())),
        }
    }

    pub fn as_string(&self) -> Result<&str, KindError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(mismatch(Kind::String, other.kind())),
        }
    }

    pub fn as_array(&self) -> Result<&Array, KindError> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(mismatch(Kind::Array, other.kind())),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array, KindError> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(mismatch(Kind::Array, other.kind())),
        }
    }

    pub fn as_object(&self) -> Result<&Object, KindError> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(mismatch(Kind::Object, other.kind())),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object, KindError> {
        match self {
            Value::Object(o) => Ok(o),
            other => Err(mismatch(Kind::Object, other.kind())),
        }
    }

    /// The element count of an array or object, or the byte length of a
    /// string.
    pub fn len(&self) -> Result<usize, KindError> {
        match self {
            Value::String(s) => Ok(s.len()),
            Value::Array(a) => Ok(a.len()),
            Value::Object(o) => Ok(o.len()),
            other => Err(KindError::new(format!(
                "cannot take the size of a {} value",
                other.kind()
            ))),
        }
    }

    /// Element of an array by index.
    pub fn at_index(&self, index: usize) -> Result<&Value, Error> {
        let array = self.as_array()?;
        array.get(index).ok_or_else(|| {
            RangeError::new(format!(
                "index {} out of range for array of {} elements",
                index,
                array.len()
            ))
            .into()
        })
    }

    /// Member of an object by key.
    pub fn at_key(&self, key: &str) -> Result<&Value, Error> {
        let object = self.as_object()?;
        object
            .get(key)
            .ok_or_else(|| NoSuchElement::new(format!("no member {:?} in object", key)).into())
    }

    /// Resolve a [Path] against this value. A wrong container kind on the way
    /// down fails with [KindError]; a missing key or index fails with
    /// [NoSuchElement].
    pub fn at_path(&self, path: &Path) -> Result<&Value, Error> {
        let mut current = self;
        for (position, element) in path.iter().enumerate() {
            current = match element {
                PathElement::Index(index) => {
                    let array = current.as_array().map_err(|_| at_path_kind(path, position, current))?;
                    array.get(*index).ok_or_else(|| -> Error {
                        NoSuchElement::new(format!(
                            "no element at {} (array holds {} elements)",
                            path.prefix(position + 1),
                            array.len()
                        ))
                        .into()
                    })?
                }
                PathElement::Key(key) => {
                    let object = current.as_object().map_err(|_| at_path_kind(path, position, current))?;
                    object.get(key).ok_or_else(|| -> Error {
                        NoSuchElement::new(format!("no element at {}", path.prefix(position + 1)))
                            .into()
                    })?
                }
            };
        }
        Ok(current)
    }

    /// Total-order comparison: kind first (in declaration order), then
    /// payload. Objects compare lexicographically over their sorted
    /// key/value pairs; decimals use the IEEE total order.
    pub fn compare(&self, other: &Value) -> Ordering {
        self.kind().cmp(&other.kind()).then_with(|| match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ordering = x.compare(y);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ordering = ka.cmp(kb).then_with(|| va.compare(vb));
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => unreachable!("kinds already compared"),
        })
    }
}

fn mismatch(expected: Kind, actual: Kind) -> KindError {
    KindError::new(format!("cannot access {} value as {}", actual, expected))
}

fn at_path_kind(path: &Path, position: usize, value: &Value) -> Error {
    KindError::new(format!(
        "cannot descend into {} value at {}",
        value.kind(),
        path.prefix(position)
    ))
    .into()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}
impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Value::Array(value)
    }
}
impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}
impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }
}
