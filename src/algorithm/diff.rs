use crate::value::{Array, Object, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The three-way split produced by [diff]: content common to both sides and
/// the remainders particular to each.
pub struct DiffResult {
    pub same: Value,
    pub left: Value,
    pub right: Value,
}

/// Structurally compare two values.
///
/// Equal values land whole in `same`. When kinds differ (or scalars are
/// unequal) each value lands in its respective side. Arrays pair
/// element-by-element over the common prefix — sub-splits keep positional
/// null placeholders so the three arrays stay aligned — and the tail of the
/// longer array lands in its side. Objects recurse on shared keys and route
/// unique keys to their side.
///
/// [recompose] layers a side back over `same` to reproduce the original
/// input.
pub fn diff(left: Value, right: Value) -> DiffResult {
    let mut result = DiffResult::default();
    if left == right {
        result.same = left;
    } else if left.kind() != right.kind() {
        result.left = left;
        result.right = right;
    } else {
        match (left, right) {
            (Value::Array(left_items), Value::Array(right_items)) => {
                let mut same = Array::with_capacity(left_items.len().min(right_items.len()));
                let mut left_out = Array::new();
                let mut right_out = Array::new();
                let mut right_iter = right_items.into_iter();
                let mut left_iter = left_items.into_iter();
                loop {
                    match (left_iter.next(), right_iter.next()) {
                        (Some(l), Some(r)) => {
                            let sub = diff(l, r);
                            same.push_back(sub.same);
                            left_out.push_back(sub.left);
                            right_out.push_back(sub.right);
                        }
                        (Some(l), None) => left_out.push_back(l),
                        (None, Some(r)) => right_out.push_back(r),
                        (None, None) => break,
                    }
                }
                result.same = Value::Array(same);
                result.left = Value::Array(left_out);
                result.right = Value::Array(right_out);
            }
            (Value::Object(left_members), Value::Object(right_members)) => {
                let mut same = Object::new();
                let mut left_out = Object::new();
                let mut right_out = Object::new();
                let mut right_members = right_members;
                for (key, left_member) in left_members {
                    match right_members.remove(&key) {
                        None => {
                            left_out.insert(key, left_member);
                        }
                        Some(right_member) if left_member == right_member => {
                            same.insert(key, left_member);
                        }
                        Some(right_member) => {
                            let sub = diff(left_member, right_member);
                            if !sub.same.is_null() {
                                same.insert(key.clone(), sub.same);
                            }
                            left_out.insert(key.clone(), sub.left);
                            right_out.insert(key, sub.right);
                        }
                    }
                }
                for (key, right_member) in right_members {
                    right_out.insert(key, right_member);
                }
                result.same = Value::Object(same);
                result.left = Value::Object(left_out);
                result.right = Value::Object(right_out);
            }
            // unequal scalars of the same kind
            (left, right) => {
                result.left = left;
                result.right = right;
            }
        }
    }
    result
}

/// Layer a diff side back over the common part: keys in `same` are kept,
/// keys in `side` added (recursing on collisions), and the positional null
/// placeholders of array splits filled pairwise. `recompose(d.same, d.left)`
/// reproduces the left input of the [diff] that produced `d`.
pub fn recompose(same: Value, side: Value) -> Value {
    if side.is_null() {
        return same;
    }
    if same.is_null() {
        return side;
    }
    match (same, side) {
        (Value::Object(same_members), Value::Object(side_members)) => {
            let mut out = same_members;
            for (key, side_member) in side_members {
                match out.remove(&key) {
                    None => {
                        out.insert(key, side_member);
                    }
                    Some(existing) => {
                        out.insert(key, recompose(existing, side_member));
                    }
                }
            }
            Value::Object(out)
        }
        (Value::Array(same_items), Value::Array(side_items)) => {
            let mut out = Array::with_capacity(same_items.len().max(side_items.len()));
            let mut same_iter = same_items.into_iter();
            let mut side_iter = side_items.into_iter();
            loop {
                match (same_iter.next(), side_iter.next()) {
                    (Some(s), Some(v)) => out.push_back(recompose(s, v)),
                    (Some(s), None) => out.push_back(s),
                    (None, Some(v)) => out.push_back(v),
                    (None, None) => break,
                }
            }
            Value::Array(out)
        }
        // a non-null side at a scalar position wins
        (_, side) => side,
    }
}
