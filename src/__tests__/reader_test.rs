use crate::parse_index::{AstNode, AstNodeType};
use crate::{Error, Reader};

const SOURCE: &str = r#"{"a": [1, 2, 3], "b": {}, "c": 4}"#;

fn walk(reader: &mut Reader<'_>) -> Vec<(char, String)> {
    let mut seen = Vec::new();
    loop {
        let glyph = reader.current().unwrap().node_type().glyph();
        let path = reader.current_path().unwrap().to_string();
        seen.push((glyph, path));
        if !reader.next_token() {
            break;
        }
    }
    seen
}

fn expected_walk() -> Vec<(char, String)> {
    [
        ('^', "."),
        ('{', "."),
        ('k', ".a"),
        ('[', ".a"),
        ('i', ".a[0]"),
        ('i', ".a[1]"),
        ('i', ".a[2]"),
        (']', ".a"),
        ('k', ".b"),
        ('{', ".b"),
        ('}', ".b"),
        ('k', ".c"),
        ('i', ".c"),
        ('}', "."),
        ('$', "."),
    ]
    .into_iter()
    .map(|(glyph, path)| (glyph, path.to_owned()))
    .collect()
}

#[test]
pub fn index_reader_projects_paths_along_the_walk() {
    let mut reader = Reader::from_source(SOURCE);
    assert_eq!(walk(&mut reader), expected_walk());
    assert!(!reader.good());
}

#[test]
pub fn value_reader_yields_the_same_stream_as_the_index_reader() {
    let tree = crate::parse(SOURCE).unwrap();
    let mut from_tree = Reader::from_value(&tree);
    assert_eq!(walk(&mut from_tree), expected_walk());
}

#[test]
pub fn exhausted_reader_reports_invalid_state() {
    let mut reader = Reader::from_source("1");
    while reader.next_token() {}
    assert!(!reader.good());
    assert!(matches!(reader.current(), Err(Error::InvalidState(_))));
    assert!(matches!(reader.current_path(), Err(Error::InvalidState(_))));
}

#[test]
pub fn next_structure_skips_a_whole_container() {
    let mut reader = Reader::from_source(SOURCE);
    // ^ -> { -> "a" -> [
    assert!(reader.next_token());
    assert!(reader.next_token());
    assert!(reader.next_token());
    assert_eq!(reader.current().unwrap().node_type(), AstNodeType::ArrayBegin);

    assert!(reader.next_structure());
    assert_eq!(reader.current().unwrap().node_type(), AstNodeType::KeyCanonical);
    assert_eq!(reader.current_path().unwrap().to_string(), ".b");
}

#[test]
pub fn next_structure_on_a_leaf_advances_one_node() {
    let mut reader = Reader::from_source("[7, 8]");
    // ^ -> [ -> 7
    assert!(reader.next_token());
    assert!(reader.next_token());
    assert_eq!(reader.current().unwrap().node_type(), AstNodeType::Integer);

    assert!(reader.next_structure());
    assert_eq!(reader.current_path().unwrap().to_string(), "[1]");
}

#[test]
pub fn next_key_walks_the_keys_of_an_object() {
    let mut reader = Reader::from_source(SOURCE);
    // ^ -> { -> "a"
    assert!(reader.next_token());
    assert!(reader.next_token());
    assert_eq!(reader.current_path().unwrap().to_string(), ".a");

    assert!(reader.next_key().unwrap());
    assert_eq!(reader.current_path().unwrap().to_string(), ".b");

    assert!(reader.next_key().unwrap());
    assert_eq!(reader.current_path().unwrap().to_string(), ".c");

    assert!(reader.next_key().unwrap());
    assert_eq!(reader.current().unwrap().node_type(), AstNodeType::ObjectEnd);

    // not at a key any more
    assert!(reader.next_key().is_err());
}

#[test]
pub fn expect_reports_the_offending_path() {
    let mut reader = Reader::from_source(SOURCE);
    assert!(reader.expect(AstNodeType::DocumentStart).is_ok());

    // ^ -> { -> "a" -> [ -> 1
    for _ in 0..4 {
        assert!(reader.next_token());
    }
    assert!(reader.expect(AstNodeType::Integer).is_ok());
    assert!(reader
        .expect_in(&[AstNodeType::Integer, AstNodeType::Decimal])
        .is_ok());

    let error = reader.expect(AstNodeType::StringCanonical).unwrap_err();
    let Error::Extraction(extraction) = error else {
        panic!("expected an extraction error");
    };
    assert_eq!(extraction.path().to_string(), ".a[0]");
}

#[test]
pub fn reader_exposes_node_payloads() {
    let mut reader = Reader::from_source(r#"{"k": "va\nl"}"#);
    // ^ -> { -> key
    assert!(reader.next_token());
    assert!(reader.next_token());
    let AstNode::KeyCanonical(key) = reader.current().unwrap() else {
        panic!("expected a canonical key");
    };
    assert_eq!(key.decode().unwrap(), "k");

    assert!(reader.next_token());
    let AstNode::StringEscaped(text) = reader.current().unwrap() else {
        panic!("expected an escaped string");
    };
    assert!(text.is_escaped());
    assert_eq!(text.decode().unwrap(), "va\nl");
    assert_eq!(text.raw(), br#"va\nl"#);
}
