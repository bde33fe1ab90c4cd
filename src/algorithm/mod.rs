//! Algorithms over value trees: structural diff, rule-driven merge,
//! traversal and validation.

mod diff;
mod merge;

pub use diff::{diff, recompose, DiffResult};
pub use merge::{
    merge, merge_explicit, DynamicMergeRules, MergeRules, RecursiveMergeRules, ThrowingMergeRules,
};

use crate::error::{ValidationError, ValidationErrorCode};
use crate::path::Path;
use crate::value::Value;

/// Depth-first pre-order walk. The visitor receives every node, containers
/// included, together with its path.
pub fn traverse<F: FnMut(&Path, &Value)>(value: &Value, mut visitor: F) {
    fn walk<F: FnMut(&Path, &Value)>(path: &mut Path, value: &Value, visitor: &mut F) {
        visitor(path, value);
        match value {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(index);
                    walk(path, item, visitor);
                    path.pop();
                }
            }
            Value::Object(members) => {
                for (key, member) in members {
                    path.push(key.as_str());
                    walk(path, member, visitor);
                    path.pop();
                }
            }
            _ => {}
        }
    }

    let mut path = Path::new();
    walk(&mut path, value, &mut visitor);
}

/// Check that `value` holds no non-finite decimal (NaN or ±∞), which has no
/// JSON spelling. The error carries the path and the offending value.
pub fn validate(value: &Value) -> Result<(), ValidationError> {
    fn walk(path: &mut Path, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Decimal(d) if !d.is_finite() => Err(ValidationError {
                code: ValidationErrorCode::NonFiniteNumber,
                path: path.clone(),
                value: value.clone(),
            }),
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(index);
                    walk(path, item)?;
                    path.pop();
                }
                Ok(())
            }
            Value::Object(members) => {
                for (key, member) in members {
                    path.push(key.as_str());
                    walk(path, member)?;
                    path.pop();
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    let mut path = Path::new();
    walk(&mut path, value)
}
