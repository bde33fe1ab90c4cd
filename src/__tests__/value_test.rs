use crate::value::{coerce, Array, Kind, Object, Value};
use crate::{Error, Path};
use pretty_assertions::assert_eq;
use std::cmp::Ordering;

fn sample_values() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Boolean(false),
        Value::Boolean(true),
        Value::Integer(-3),
        Value::Integer(7),
        Value::Decimal(-0.5),
        Value::Decimal(7.0),
        Value::String(String::new()),
        Value::String("abc".to_owned()),
        Value::from(vec![Value::Integer(1), Value::Integer(2)]),
        crate::parse(r#"{"a": 1, "b": [true, null]}"#).unwrap(),
    ]
}

#[test]
pub fn kind_matches_the_payload() {
    assert_eq!(Value::Null.kind(), Kind::Null);
    assert_eq!(Value::Boolean(true).kind(), Kind::Boolean);
    assert_eq!(Value::Integer(1).kind(), Kind::Integer);
    assert_eq!(Value::Decimal(1.0).kind(), Kind::Decimal);
    assert_eq!(Value::from("x").kind(), Kind::String);
    assert_eq!(Value::array().kind(), Kind::Array);
    assert_eq!(Value::object().kind(), Kind::Object);
}

#[test]
pub fn wrong_kind_access_fails() {
    let value = Value::from("text");
    assert!(value.as_integer().is_err());
    assert!(value.as_boolean().is_err());
    assert!(value.as_array().is_err());
    assert!(value.as_string().is_ok());

    // integers widen to decimal, nothing else does
    assert_eq!(Value::Integer(4).as_decimal().unwrap(), 4.0);
    assert!(Value::Boolean(true).as_decimal().is_err());
}

#[test]
pub fn take_leaves_null_behind() {
    let mut value = Value::from(vec![Value::Integer(1)]);
    let taken = value.take();
    assert!(value.is_null());
    assert_eq!(taken.kind(), Kind::Array);
}

#[test]
pub fn integer_and_decimal_are_distinct_kinds() {
    assert_ne!(Value::Integer(1), Value::Decimal(1.0));
}

#[test]
pub fn object_equality_is_insertion_order_independent() {
    let mut forward = Object::new();
    forward.insert("a", Value::Integer(1));
    forward.insert("b", Value::Integer(2));

    let mut backward = Object::new();
    backward.insert("b", Value::Integer(2));
    backward.insert("a", Value::Integer(1));

    assert_eq!(Value::Object(forward), Value::Object(backward));
}

#[test]
pub fn object_iteration_is_sorted_by_key() {
    let mut object = Object::new();
    object.insert("zebra", Value::Integer(1));
    object.insert("apple", Value::Integer(2));
    object.insert("mango", Value::Integer(3));

    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    assert_eq!(keys, ["apple", "mango", "zebra"]);
}

#[test]
pub fn equality_agrees_with_compare() {
    let values = sample_values();
    for a in &values {
        assert_eq!(a.compare(a), Ordering::Equal, "compare is reflexive");
        for b in &values {
            assert_eq!(a == b, a.compare(b) == Ordering::Equal);
            assert_eq!(a.compare(b), b.compare(a).reverse(), "antisymmetry");
            for c in &values {
                if a.compare(b) != Ordering::Greater && b.compare(c) != Ordering::Greater {
                    assert_ne!(a.compare(c), Ordering::Greater, "transitivity");
                }
            }
        }
    }
}

#[test]
pub fn compare_orders_by_kind_first() {
    let mut values = sample_values();
    values.sort();
    let kinds: Vec<Kind> = values.iter().map(Value::kind).collect();
    let mut sorted_kinds = kinds.clone();
    sorted_kinds.sort();
    assert_eq!(kinds, sorted_kinds);
}

#[test]
pub fn len_covers_strings_and_containers() {
    assert_eq!(Value::from("abcd").len().unwrap(), 4);
    assert_eq!(Value::from(vec![Value::Null]).len().unwrap(), 1);
    assert_eq!(Value::object().len().unwrap(), 0);
    assert!(Value::Integer(3).len().is_err());
}

#[test]
pub fn array_pushes_at_both_ends() {
    let mut array = Array::new();
    array.push_back(Value::Integer(2));
    array.push_front(Value::Integer(1));
    array.push_back(Value::Integer(3));
    assert_eq!(array.len(), 3);
    assert_eq!(array.get(0), Some(&Value::Integer(1)));
    assert_eq!(array.get(2), Some(&Value::Integer(3)));
    assert_eq!(array.pop_front(), Some(Value::Integer(1)));
}

#[test]
pub fn path_resolution_distinguishes_missing_from_mismatched() {
    let tree = crate::parse(r#"{"a": [{"b": {"c": 7}}]}"#).unwrap();

    let path = Path::parse(".a[0].b").unwrap() + "c";
    assert_eq!(tree.at_path(&path).unwrap(), &Value::Integer(7));

    let missing = Path::parse(".a[3]").unwrap();
    assert!(matches!(
        tree.at_path(&missing).unwrap_err(),
        Error::NoSuchElement(_)
    ));

    let missing_key = Path::parse(".nope").unwrap();
    assert!(matches!(
        tree.at_path(&missing_key).unwrap_err(),
        Error::NoSuchElement(_)
    ));

    let mismatched = Path::parse(".a.b").unwrap();
    assert!(matches!(tree.at_path(&mismatched).unwrap_err(), Error::Kind(_)));
}

#[test]
pub fn coercions_widen_and_narrow() {
    assert_eq!(coerce::coerce_integer(&Value::Decimal(3.9)).unwrap(), 3);
    assert_eq!(coerce::coerce_integer(&Value::Boolean(true)).unwrap(), 1);
    assert_eq!(coerce::coerce_integer(&Value::from("42")).unwrap(), 42);
    assert!(coerce::coerce_integer(&Value::from("x")).is_err());

    assert_eq!(coerce::coerce_decimal(&Value::from("2.5")).unwrap(), 2.5);
    assert_eq!(coerce::coerce_decimal(&Value::Integer(2)).unwrap(), 2.0);

    assert!(!coerce::coerce_boolean(&Value::from("")).unwrap());
    assert!(coerce::coerce_boolean(&Value::from("x")).unwrap());
    assert!(!coerce::coerce_boolean(&Value::Null).unwrap());
    assert!(coerce::coerce_boolean(&Value::Integer(2)).unwrap());

    assert_eq!(coerce::coerce_string(&Value::from("s")), "s");
    assert_eq!(coerce::coerce_string(&Value::Boolean(true)), "true");
    assert_eq!(coerce::coerce_string(&Value::Integer(5)), "5");

    assert!(coerce::coerce_null(&Value::Null).is_ok());
    assert!(coerce::coerce_null(&Value::Integer(0)).is_err());

    assert!(coerce::can_coerce(Kind::String, Kind::Boolean));
    assert!(!coerce::can_coerce(Kind::Integer, Kind::Array));
}
