use crate::{ParseErrorCode, Path, PathElement};

#[test]
pub fn root_path_renders_as_a_dot() {
    let root = Path::parse(".").unwrap();
    assert!(root.is_empty());
    assert_eq!(root.to_string(), ".");
}

#[test]
pub fn simple_paths_round_trip_through_their_rendering() {
    for spec in [".a", ".a[0].b", "[2][3]", ".a.b.c", ".$ref[10]._x"] {
        let path = Path::parse(spec).unwrap();
        assert_eq!(path.to_string(), spec);
        assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
    }
}

#[test]
pub fn arbitrary_keys_render_in_the_quoted_form() {
    let mut path = Path::new();
    path.push("weird key");
    path.push(4usize);
    path.push("tab\there");

    let rendered = path.to_string();
    assert_eq!(rendered, r#"["weird key"][4]["tab\there"]"#);
    assert_eq!(Path::parse(&rendered).unwrap(), path);
}

#[test]
pub fn quoted_form_parses_escapes() {
    let path = Path::parse(r#"["a\"b"]"#).unwrap();
    assert_eq!(path.get(0), Some(&PathElement::Key("a\"b".to_owned())));
}

#[test]
pub fn invalid_specifications_are_rejected() {
    for spec in ["a", ".a.", "[", "[x]", "[01]", "[-1]", "[1.5]", r#"["open"#, "[3)"] {
        let error = Path::parse(spec).unwrap_err();
        assert_eq!(error.code, ParseErrorCode::InvalidPath, "spec {:?}", spec);
    }
}

#[test]
pub fn paths_compose_by_concatenation() {
    let base = Path::parse(".a[0]").unwrap();
    let composed = base.clone() + "b" + 2usize;
    assert_eq!(composed.to_string(), ".a[0].b[2]");

    let suffix = Path::parse(".x.y").unwrap();
    let joined = base + &suffix;
    assert_eq!(joined.to_string(), ".a[0].x.y");

    let child = joined.child("z");
    assert_eq!(child.len(), 5);
    assert_eq!(child.prefix(2).to_string(), ".a[0]");
}

#[test]
pub fn elements_expose_their_payload() {
    let path = Path::parse(".key[7]").unwrap();
    assert_eq!(path.get(0), Some(&PathElement::Key("key".to_owned())));
    assert_eq!(path.get(1), Some(&PathElement::Index(7)));
    assert_eq!(path.get(2), None);

    let elements: Vec<&PathElement> = path.iter().collect();
    assert_eq!(elements.len(), 2);
}
