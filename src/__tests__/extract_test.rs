use crate::parse_index::{AstNode, AstNodeType};
use crate::serialization::{
    ExtractContext, ExtractOptions, Extractor, FnExtractor, Formats, OnError, ProblemCollector,
    Version,
};
use crate::{ExtractionError, Path, Problem, Reader};
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
struct Point {
    x: i64,
    y: i64,
}

struct PointExtractor;

impl Extractor<Point> for PointExtractor {
    fn extract(
        &self,
        _context: &ExtractContext,
        reader: &mut Reader<'_>,
    ) -> Result<Point, ExtractionError> {
        let fail = |reader: &Reader<'_>, message: &str| {
            ExtractionError::single(
                reader.current_path().cloned().unwrap_or_default(),
                message.to_owned(),
            )
        };

        reader
            .expect(AstNodeType::ObjectBegin)
            .map_err(|_| fail(reader, "expected an object"))?;
        reader.next_token();

        let mut x = None;
        let mut y = None;
        loop {
            match reader.current().map_err(|_| fail(reader, "unexpected end"))? {
                AstNode::ObjectEnd => break,
                AstNode::KeyCanonical(key) | AstNode::KeyEscaped(key) => {
                    let name = key
                        .decode()
                        .map_err(|_| fail(reader, "undecodable key"))?
                        .into_owned();
                    reader.next_token();
                    let AstNode::Integer(node) =
                        reader.current().map_err(|_| fail(reader, "unexpected end"))?
                    else {
                        return Err(fail(reader, "expected an integer member"));
                    };
                    let value = node.value().map_err(|e| {
                        fail(reader, &format!("bad integer literal: {}", e))
                    })?;
                    match name.as_str() {
                        "x" => x = Some(value),
                        "y" => y = Some(value),
                        other => return Err(fail(reader, &format!("unknown member {:?}", other))),
                    }
                    reader.next_token();
                }
                _ => return Err(fail(reader, "expected a key")),
            }
        }

        match (x, y) {
            (Some(x), Some(y)) => Ok(Point { x, y }),
            _ => Err(fail(reader, "point needs both x and y")),
        }
    }
}

fn point_formats() -> Formats {
    let mut formats = Formats::new();
    formats
        .register_extractor::<Point>(Arc::new(PointExtractor))
        .unwrap();
    formats
}

#[test]
pub fn a_registered_extractor_converts_from_a_reader() {
    let context = ExtractContext::new(point_formats());

    let mut reader = Reader::from_source(r#"{"x": 3, "y": 4}"#);
    reader.next_token(); // step off the document-start marker

    let point: Point = context.extract(&mut reader).unwrap();
    assert_eq!(point, Point { x: 3, y: 4 });
}

#[test]
pub fn extraction_problems_carry_the_failing_path() {
    let context = ExtractContext::new(point_formats());

    let mut reader = Reader::from_source(r#"{"x": 3, "y": "four"}"#);
    reader.next_token();

    let error = context.extract::<Point>(&mut reader).unwrap_err();
    assert_eq!(error.path().to_string(), ".y");
    assert!(error.to_string().contains(".y"));
}

#[test]
pub fn registering_a_type_twice_is_a_duplicate_type_error() {
    let mut formats = point_formats();
    let error = formats
        .register_extractor::<Point>(Arc::new(PointExtractor))
        .unwrap_err();
    assert!(error.type_name.contains("Point"));
}

#[test]
pub fn a_closure_can_serve_as_an_extractor() {
    let mut formats = Formats::new();
    formats
        .register_extractor::<i64>(Arc::new(FnExtractor(
            |_context: &ExtractContext, reader: &mut Reader<'_>| match reader.current() {
                Ok(AstNode::Integer(node)) => node
                    .value()
                    .map_err(|e| ExtractionError::single(Path::new(), e.to_string())),
                _ => Err(ExtractionError::single(Path::new(), "expected an integer")),
            },
        )))
        .unwrap();

    let context = ExtractContext::new(formats);
    let mut reader = Reader::from_source("41");
    reader.next_token();
    let value: i64 = context.extract(&mut reader).unwrap();
    assert_eq!(value, 41);
}

#[test]
pub fn missing_extractor_names_the_type() {
    let context = ExtractContext::new(Formats::new());
    let mut reader = Reader::from_source("{}");
    let error = context.extract::<Point>(&mut reader).unwrap_err();
    assert!(error.to_string().contains("Point"));
}

#[test]
pub fn context_carries_version_and_user_data() {
    let context = ExtractContext::new(Formats::new())
        .with_version(Version::new(2, 1))
        .with_user_data(Arc::new(7usize));

    assert_eq!(context.version(), Version::new(2, 1));
    let data = context.user_data().unwrap();
    assert_eq!(data.downcast_ref::<usize>(), Some(&7));
}

#[test]
pub fn collector_fails_immediately_by_default() {
    let options = ExtractOptions::default();
    let mut collector = ProblemCollector::new(&options);
    let error = collector
        .push(Problem::new(Path::new(), "first"))
        .unwrap_err();
    assert_eq!(error.problems().len(), 1);
}

#[test]
pub fn collector_accumulates_up_to_the_failure_cap() {
    let options = ExtractOptions::new().on_error(OnError::CollectAll).max_failures(3);
    let mut collector = ProblemCollector::new(&options);

    collector.push(Problem::new(Path::new(), "one")).unwrap();
    collector
        .push(Problem::new(Path::parse(".a").unwrap(), "two"))
        .unwrap();
    let error = collector
        .push(Problem::new(Path::parse(".b[0]").unwrap(), "three"))
        .unwrap_err();

    assert_eq!(error.problems().len(), 3);
    let rendered = error.to_string();
    assert!(rendered.contains("3 problems"));
    assert!(rendered.contains(".a"));
    assert!(rendered.contains(".b[0]"));
}

#[test]
pub fn collector_with_no_problems_finishes_clean() {
    let options = ExtractOptions::new().on_error(OnError::CollectAll);
    let collector = ProblemCollector::new(&options);
    assert!(collector.is_empty());
    assert!(collector.finish().is_ok());
}

#[test]
pub fn global_formats_and_demangle_hook_are_process_wide() {
    // exercised in one test to keep the global slots race-free
    crate::serialization::Formats::reset_global();
    let context = ExtractContext::default();
    let mut reader = Reader::from_source("1");
    assert!(context.extract::<Point>(&mut reader).is_err());

    Formats::set_global(point_formats());
    let replaced = ExtractContext::default();
    let mut reader = Reader::from_source(r#"{"x": 1, "y": 2}"#);
    reader.next_token();
    let point: Point = replaced.extract(&mut reader).unwrap();
    assert_eq!(point, Point { x: 1, y: 2 });
    Formats::reset_global();

    crate::set_demangle_function(|name| {
        name.rsplit("::").next().unwrap_or(name).to_owned()
    });
    let bare = ExtractContext::new(Formats::new());
    let mut reader = Reader::from_source("{}");
    let error = bare.extract::<Point>(&mut reader).unwrap_err();
    assert!(error.to_string().contains("for type Point"));
    crate::reset_demangle_function();
}
