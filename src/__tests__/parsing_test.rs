use crate::parse_index::{FailureMode, NumberMode, ParseIndex, ParseOptions};
use crate::serialization::{DuplicateKeyAction, ExtractOptions, IntegerOverflowAction};
use crate::{AstNodeType, Kind, ParseErrorCode, Path, Value};

#[test]
pub fn simple_document_parses_to_the_expected_index_and_tree() {
    let index = ParseIndex::parse(r#"{ "a": 1, "b": [2, 3.5, "x"] }"#);
    assert!(index.success());
    assert_eq!(index.to_string(), "^{kik[ids]}$");

    let tree = index.extract_tree().unwrap();
    assert_eq!(tree.kind(), Kind::Object);
    assert_eq!(tree.len().unwrap(), 2);
    assert_eq!(tree.at_key("a").unwrap(), &Value::Integer(1));

    let b1 = tree.at_path(&Path::parse(".b[1]").unwrap()).unwrap();
    assert_eq!(b1.kind(), Kind::Decimal);
    assert_eq!(b1.as_decimal().unwrap(), 3.5);
}

#[test]
pub fn escaped_bmp_code_point_decodes_to_utf8() {
    let value = crate::parse(r#""\u00e9""#).unwrap();
    assert_eq!(value.as_string().unwrap().as_bytes(), &[0xC3, 0xA9]);
}

#[test]
pub fn surrogate_pair_decodes_to_a_supplementary_code_point() {
    let value = crate::parse(r#""\uD83D\uDE00""#).unwrap();
    assert_eq!(
        value.as_string().unwrap().as_bytes(),
        &[0xF0, 0x9F, 0x98, 0x80]
    );

    // raw UTF-8 passes through untouched
    let raw = crate::parse(r#""😀""#).unwrap();
    assert_eq!(raw, value);
}

#[test]
pub fn truncated_literal_fails_at_its_starting_offset() {
    let index = ParseIndex::parse("tru");
    assert!(!index.success());

    let error = index.validate().unwrap_err();
    assert_eq!(error.code, ParseErrorCode::UnexpectedToken);
    assert_eq!(error.offset, 0);
    assert_eq!(error.line, 1);
    assert_eq!(error.column, 1);
}

#[test]
pub fn successful_index_is_balanced() {
    let index = ParseIndex::parse(r#"[{"a":[1,{"b":[]}]},[[]],{},null]"#);
    assert!(index.success());

    let mut depth = 0i64;
    let mut saw_end = false;
    for node in index.iter() {
        match node.node_type() {
            AstNodeType::DocumentStart => assert_eq!(depth, 0),
            AstNodeType::ObjectBegin | AstNodeType::ArrayBegin => depth += 1,
            AstNodeType::ObjectEnd | AstNodeType::ArrayEnd => {
                depth -= 1;
                assert!(depth >= 0);
            }
            AstNodeType::DocumentEnd => {
                assert_eq!(depth, 0);
                saw_end = true;
            }
            AstNodeType::Error => panic!("successful index holds an error node"),
            _ => {}
        }
    }
    assert!(saw_end);
}

#[test]
pub fn extracted_tree_equals_directly_parsed_tree() {
    let source = r#"{"k": [true, null, -3, 0.25, "s\n"], "m": {"n": []}}"#;
    let via_index = ParseIndex::parse(source).extract_tree().unwrap();
    let direct = crate::parse(source).unwrap();
    assert_eq!(via_index, direct);
}

#[test]
pub fn compact_encoding_matches_serde_json_canonical_form() {
    let source = r#"{"z":[1,2.5,true,null,"x"],"a":{"k":"v"},"empty":[]}"#;
    let ours = crate::parse(source).unwrap().to_string();
    let reference: serde_json::Value = serde_json::from_str(source).unwrap();
    assert_eq!(ours, serde_json::to_string(&reference).unwrap());
}

#[test]
pub fn comments_require_the_option() {
    let source = "[1, // one\n 2] /* done */";
    assert!(!ParseIndex::parse(source).success());

    let options = ParseOptions::new().allow_comments(true);
    let index = ParseIndex::parse_with_options(source, &options);
    assert!(index.success());
    assert_eq!(
        index.extract_tree().unwrap(),
        Value::from(vec![Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
pub fn trailing_commas_require_the_option() {
    assert!(!ParseIndex::parse("[1, 2,]").success());
    assert!(!ParseIndex::parse(r#"{"a": 1,}"#).success());

    let options = ParseOptions::new().allow_trailing_comma(true);
    assert!(ParseIndex::parse_with_options("[1, 2,]", &options).success());
    assert!(ParseIndex::parse_with_options(r#"{"a": 1,}"#, &options).success());
}

#[test]
pub fn unquoted_keys_require_the_option() {
    let source = "{a: 1, $b: 2}";
    assert!(!ParseIndex::parse(source).success());

    let options = ParseOptions::new().allow_unquoted_keys(true);
    let tree = ParseIndex::parse_with_options(source, &options)
        .extract_tree()
        .unwrap();
    assert_eq!(tree.at_key("a").unwrap(), &Value::Integer(1));
    assert_eq!(tree.at_key("$b").unwrap(), &Value::Integer(2));
}

#[test]
pub fn non_finite_spellings_require_the_option() {
    let index = ParseIndex::parse("NaN");
    assert!(!index.success());
    assert_eq!(index.validate().unwrap_err().code, ParseErrorCode::BadNumber);

    let options = ParseOptions::new().numbers(NumberMode::DecimalNanInfAllowed);
    let nan = ParseIndex::parse_with_options("NaN", &options)
        .extract_tree()
        .unwrap();
    assert!(nan.as_decimal().unwrap().is_nan());

    let negative_infinity = ParseIndex::parse_with_options("-Infinity", &options)
        .extract_tree()
        .unwrap();
    assert_eq!(negative_infinity.as_decimal().unwrap(), f64::NEG_INFINITY);
}

#[test]
pub fn structure_depth_is_bounded() {
    let options = ParseOptions::new().max_structure_depth(3);
    let shallow = ParseIndex::parse_with_options("[[[1]]]", &options);
    assert!(shallow.success());

    let deep = ParseIndex::parse_with_options("[[[[1]]]]", &options);
    assert!(!deep.success());
    assert_eq!(deep.validate().unwrap_err().code, ParseErrorCode::DepthExceeded);
}

#[test]
pub fn ignore_mode_recovers_at_the_next_structural_boundary() {
    let options = ParseOptions::new().failure_mode(FailureMode::Ignore);
    let index = ParseIndex::parse_with_options("[1, oops, 3]", &options);

    assert!(!index.success());
    assert_eq!(index.errors().len(), 1);
    assert_eq!(index.errors()[0].code, ParseErrorCode::UnexpectedToken);
    assert_eq!(index.to_string(), "^[i!i]$");
}

#[test]
pub fn fail_immediately_stops_at_the_first_error() {
    let index = ParseIndex::parse("[1, oops, 3]");
    assert_eq!(index.errors().len(), 1);
    assert_eq!(index.to_string(), "^[i!");
}

#[test]
pub fn duplicate_keys_honor_the_configured_action() {
    let source = r#"{"k": 1, "k": 2}"#;
    let index = ParseIndex::parse(source);
    assert!(index.success());

    let replaced = index.extract_tree().unwrap();
    assert_eq!(replaced.at_key("k").unwrap(), &Value::Integer(2));

    let ignored = index
        .extract_tree_with_options(&ExtractOptions::new().on_duplicate_key(DuplicateKeyAction::Ignore))
        .unwrap();
    assert_eq!(ignored.at_key("k").unwrap(), &Value::Integer(1));

    let failed = index
        .extract_tree_with_options(&ExtractOptions::new().on_duplicate_key(DuplicateKeyAction::Fail))
        .unwrap_err();
    assert_eq!(failed.code, ParseErrorCode::DuplicateKey);
}

#[test]
pub fn integer_overflow_honors_the_configured_action() {
    let source = "99999999999999999999";
    let index = ParseIndex::parse(source);
    assert!(index.success());
    assert_eq!(index.to_string(), "^i$");

    let failed = index.extract_tree().unwrap_err();
    assert_eq!(failed.code, ParseErrorCode::BadNumber);

    let coerced = index
        .extract_tree_with_options(
            &ExtractOptions::new().on_integer_overflow(IntegerOverflowAction::CoerceDecimal),
        )
        .unwrap();
    assert_eq!(coerced.kind(), Kind::Decimal);
    assert_eq!(coerced.as_decimal().unwrap(), 1e20);
}

#[test]
pub fn invalid_utf8_honors_the_string_encoding_action() {
    let source = b"\"a\xFFb\"".to_vec();

    let replaced = ParseIndex::parse(source.clone()).extract_tree().unwrap();
    assert_eq!(replaced.as_string().unwrap(), "a\u{FFFD}b");

    let failed = ParseIndex::parse_with_options(source, &ParseOptions::strict())
        .extract_tree()
        .unwrap_err();
    assert_eq!(failed.code, ParseErrorCode::InvalidUtf8);
}

#[test]
pub fn unpaired_surrogates_honor_the_string_encoding_action() {
    let source = r#""\uD800!""#;

    let replaced = crate::parse(source).unwrap();
    assert_eq!(replaced.as_string().unwrap(), "\u{FFFD}!");

    let failed = crate::parse_with_options(source, &ParseOptions::strict()).unwrap_err();
    assert_eq!(failed.code, ParseErrorCode::BadEscape);
}

#[test]
pub fn error_positions_count_lines_and_columns() {
    let index = ParseIndex::parse("{\n  \"a\": tru\n}");
    let error = index.validate().unwrap_err();
    assert_eq!(error.line, 2);
    assert_eq!(error.column, 8);
    assert_eq!(error.offset, 9);
}
