use crate::{encode, to_string_with_options, EncodeOptions, Encoder, Value};

#[test]
pub fn values_round_trip_through_the_compact_form() {
    let sources = [
        "null",
        "true",
        "false",
        "0",
        "-42",
        "3.5",
        "-5.0",
        "0.0000001",
        r#""""#,
        r#""line\nbreak and \"quotes\"""#,
        r#""héllo 😀""#,
        "[]",
        "{}",
        r#"[1, [2, [3, {}]], {"a": null}]"#,
        r#"{"a": 1, "b": [2, 3.5, "x"], "c": {"d": true}}"#,
    ];
    for source in sources {
        let value = crate::parse(source).unwrap();
        let encoded = value.to_string();
        let reparsed = crate::parse(&encoded).unwrap();
        assert_eq!(reparsed, value, "round trip of {}", source);
    }
}

#[test]
pub fn decimals_keep_their_kind_through_a_round_trip() {
    let value = Value::Decimal(3.0);
    assert_eq!(value.to_string(), "3.0");

    let reparsed = crate::parse(&value.to_string()).unwrap();
    assert_eq!(reparsed.kind(), crate::Kind::Decimal);

    assert_eq!(Value::Integer(3).to_string(), "3");
}

#[test]
pub fn non_finite_decimals_emit_null() {
    assert_eq!(Value::Decimal(f64::NAN).to_string(), "null");
    assert_eq!(Value::Decimal(f64::INFINITY).to_string(), "null");
}

#[test]
pub fn compact_form_has_no_whitespace_and_sorted_keys() {
    let value = crate::parse(r#"{ "z" : 1 , "a" : [ true , null ] }"#).unwrap();
    assert_eq!(value.to_string(), r#"{"a":[true,null],"z":1}"#);
}

#[test]
pub fn pretty_form_indents_nested_structure() {
    let value = crate::parse(r#"{"a": [1, 2], "b": "x"}"#).unwrap();
    let pretty = to_string_with_options(&value, &EncodeOptions::new().pretty(2));
    assert_eq!(
        pretty,
        "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": \"x\"\n}"
    );
}

#[test]
pub fn pretty_empty_containers_stay_on_one_line() {
    let value = crate::parse(r#"{"a": [], "b": {}}"#).unwrap();
    let pretty = to_string_with_options(&value, &EncodeOptions::new().pretty(2));
    assert_eq!(pretty, "{\n  \"a\": [],\n  \"b\": {}\n}");
}

#[test]
pub fn ascii_only_escapes_non_ascii_with_surrogate_pairs() {
    let value = crate::parse(r#""é😀""#).unwrap();
    let escaped = to_string_with_options(&value, &EncodeOptions::new().ascii_only(true));
    assert_eq!(escaped, r#""\u00e9\ud83d\ude00""#);

    // and the escaped form decodes back to the same value
    assert_eq!(crate::parse(&escaped).unwrap(), value);
}

#[test]
pub fn control_characters_are_always_escaped() {
    let value = Value::from("a\u{0001}b\tc");
    assert_eq!(value.to_string(), r#""a\u0001b\tc""#);
}

#[test]
pub fn token_level_encoder_emits_a_document_by_hand() {
    let mut out = String::new();
    let mut encoder = Encoder::new(&mut out);
    encoder.begin_object().unwrap();
    encoder.key("items").unwrap();
    encoder.begin_array().unwrap();
    encoder.integer(1).unwrap();
    encoder.decimal(2.5).unwrap();
    encoder.string("three").unwrap();
    encoder.end_array().unwrap();
    encoder.key("ok").unwrap();
    encoder.boolean(true).unwrap();
    encoder.end_object().unwrap();

    assert_eq!(out, r#"{"items":[1,2.5,"three"],"ok":true}"#);
}

#[test]
pub fn encode_writes_into_any_fmt_writer() {
    let value = crate::parse("[1, 2]").unwrap();
    let mut out = String::new();
    encode(&value, &mut out, &EncodeOptions::default()).unwrap();
    assert_eq!(out, "[1,2]");
}
