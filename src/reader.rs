use crate::error::{Error, ExtractionError};
use crate::parse_index::{
    AstNode, AstNodeType, DecimalNode, IntegerNode, ParseIndex, ParseOptions, StringNode,
};
use crate::path::{Path, PathElement};
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
enum TreeEvent<'a> {
    DocumentStart,
    DocumentEnd,
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
    Key(&'a str),
    Scalar(&'a Value),
}

enum Backend<'a> {
    Index(ParseIndex),
    Tree(Vec<TreeEvent<'a>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    container: Container,
    /// An index or key element for this container is currently on the path.
    occupied: bool,
}

/// A cursor presenting a uniform [AstNode] stream with current-path
/// tracking, over either a packed [ParseIndex] or a materialized [Value]
/// tree.
///
/// The path points at the enclosing container while its begin or end marker
/// is current, at a key from the moment the key is read through the value
/// that follows it, and at `[i]` for the i-th element of an array:
///
/// ```text
/// ^               /* "."  -- start of document is the root path */
/// {               /* "."  -- opening brace is still the root */
///   "a":          /* ".a" -- the key starts the path */
///     [           /* ".a" -- the path refers to the entire array */
///       1,        /* ".a[0]" */
///       2,        /* ".a[1]" */
///     ],          /* ".a" */
///   "b":          /* ".b" */
///     4           /* ".b" */
/// }               /* "." */
/// $               /* "." */
/// ```
pub struct Reader<'a> {
    backend: Backend<'a>,
    position: usize,
    length: usize,
    path: Path,
    frames: Vec<Frame>,
}

impl Reader<'static> {
    /// Read from a parsed index. The reader takes ownership; the index's
    /// source buffer keeps the text alive.
    pub fn from_index(index: ParseIndex) -> Reader<'static> {
        let length = index.len();
        Reader {
            backend: Backend::Index(index),
            position: 0,
            length,
            path: Path::new(),
            frames: Vec::new(),
        }
    }

    /// Parse `source` with default options and read from the result.
    pub fn from_source(source: &str) -> Reader<'static> {
        Self::from_index(ParseIndex::parse(source))
    }

    pub fn from_source_with_options(source: &str, options: &ParseOptions) -> Reader<'static> {
        Self::from_index(ParseIndex::parse_with_options(source, options))
    }
}

impl<'a> Reader<'a> {
    /// Read from an in-memory value tree, which must outlive the reader.
    pub fn from_value(value: &'a Value) -> Reader<'a> {
        let mut events = Vec::new();
        events.push(TreeEvent::DocumentStart);
        push_events(&mut events, value);
        events.push(TreeEvent::DocumentEnd);
        let length = events.len();
        Reader {
            backend: Backend::Tree(events),
            position: 0,
            length,
            path: Path::new(),
            frames: Vec::new(),
        }
    }

    /// Whether the reader still points at a node. Once `false`,
    /// [current](Reader::current) and [current_path](Reader::current_path)
    /// fail.
    pub fn good(&self) -> bool {
        self.position < self.length
    }

    /// The node the reader points at.
    pub fn current(&self) -> Result<AstNode<'_>, Error> {
        if !self.good() {
            return Err(Error::InvalidState(
                "reader is exhausted; check good() before reading".to_owned(),
            ));
        }
        Ok(self.node_at(self.position))
    }

    /// The path to the current node.
    pub fn current_path(&self) -> Result<&Path, Error> {
        if !self.good() {
            return Err(Error::InvalidState(
                "reader is exhausted; check good() before reading".to_owned(),
            ));
        }
        Ok(&self.path)
    }

    /// Check that the current node has the expected type. A mismatch reports
    /// an extraction problem at the current path.
    pub fn expect(&self, node_type: AstNodeType) -> Result<(), Error> {
        self.expect_in(&[node_type])
    }

    /// Check that the current node has one of the expected types.
    pub fn expect_in(&self, types: &[AstNodeType]) -> Result<(), Error> {
        let actual = self.current()?.node_type();
        if types.contains(&actual) {
            return Ok(());
        }
        let expected = types
            .iter()
            .map(|t| format!("{:?}", t))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(ExtractionError::single(
            self.path.clone(),
            format!("expected {} node, found {:?}", expected, actual),
        )
        .into())
    }

    /// Advance one node in depth-first order over structural markers and
    /// leaves. Returns whether the reader is still good.
    pub fn next_token(&mut self) -> bool {
        if !self.good() {
            return false;
        }
        self.position += 1;
        if !self.good() {
            return false;
        }
        self.project_path();
        true
    }

    /// If the current node begins a structure, advance to one past its
    /// matching end; otherwise advance one node.
    pub fn next_structure(&mut self) -> bool {
        let Ok(node) = self.current() else {
            return false;
        };
        if !node.node_type().is_begin() {
            return self.next_token();
        }
        let mut depth = 0usize;
        loop {
            match self.current().map(|n| n.node_type()) {
                Ok(t) if t.is_begin() => depth += 1,
                Ok(t) if t.is_end() => {
                    depth -= 1;
                    if depth == 0 {
                        return self.next_token();
                    }
                }
                _ => {}
            }
            if !self.next_token() {
                return false;
            }
        }
    }

    /// From an object key, advance to the next key of the same object (or to
    /// its end marker), skipping the value in between.
    pub fn next_key(&mut self) -> Result<bool, Error> {
        if !self.current()?.node_type().is_key() {
            return Err(Error::InvalidState(
                "next_key is only valid when the reader points at an object key".to_owned(),
            ));
        }
        if !self.next_token() {
            return Ok(false);
        }
        Ok(self.next_structure())
    }

    fn node_at(&self, position: usize) -> AstNode<'_> {
        match &self.backend {
            Backend::Index(index) => index
                .node_at(position)
                .expect("position is bounded by length"),
            Backend::Tree(events) => match events[position] {
                TreeEvent::DocumentStart => AstNode::DocumentStart,
                TreeEvent::DocumentEnd => AstNode::DocumentEnd,
                TreeEvent::ObjectBegin => AstNode::ObjectBegin,
                TreeEvent::ObjectEnd => AstNode::ObjectEnd,
                TreeEvent::ArrayBegin => AstNode::ArrayBegin,
                TreeEvent::ArrayEnd => AstNode::ArrayEnd,
                TreeEvent::Key(key) => AstNode::KeyCanonical(StringNode::decoded(key)),
                TreeEvent::Scalar(value) => match value {
                    Value::Null => AstNode::LiteralNull,
                    Value::Boolean(true) => AstNode::LiteralTrue,
                    Value::Boolean(false) => AstNode::LiteralFalse,
                    Value::Integer(n) => AstNode::Integer(IntegerNode::parsed(*n)),
                    Value::Decimal(d) => AstNode::Decimal(DecimalNode::parsed(*d)),
                    Value::String(s) => AstNode::StringCanonical(StringNode::decoded(s)),
                    _ => unreachable!("containers are event sequences"),
                },
            },
        }
    }

    /// Re-project the path after arriving at the current node.
    fn project_path(&mut self) {
        enum Step {
            Nothing,
            EnterValue,
            Push(Container),
            Pop,
            Key(String),
        }

        let step = {
            let node = self.node_at(self.position);
            match node {
                AstNode::DocumentStart | AstNode::DocumentEnd | AstNode::Error(_) => Step::Nothing,
                AstNode::ObjectBegin => Step::Push(Container::Object),
                AstNode::ArrayBegin => Step::Push(Container::Array),
                AstNode::ObjectEnd | AstNode::ArrayEnd => Step::Pop,
                AstNode::KeyCanonical(key) | AstNode::KeyEscaped(key) => Step::Key(
                    key.decode()
                        .map(|text| text.into_owned())
                        .unwrap_or_default(),
                ),
                _ => Step::EnterValue,
            }
        };

        match step {
            Step::Nothing => {}
            Step::EnterValue => self.enter_value_position(),
            Step::Push(container) => {
                self.enter_value_position();
                self.frames.push(Frame {
                    container,
                    occupied: false,
                });
            }
            Step::Pop => {
                if let Some(frame) = self.frames.pop() {
                    if frame.occupied {
                        self.path.pop();
                    }
                }
            }
            Step::Key(key) => {
                if let Some(frame) = self.frames.last_mut() {
                    debug_assert_eq!(frame.container, Container::Object);
                    if frame.occupied {
                        self.path.pop();
                    }
                    frame.occupied = true;
                }
                self.path.push(key);
            }
        }
    }

    /// The current node is a value; if the enclosing container is an array,
    /// set or advance its index element on the path.
    fn enter_value_position(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.container == Container::Array {
                if frame.occupied {
                    if let Some(PathElement::Index(index)) = self.path.last_mut() {
                        *index += 1;
                    }
                } else {
                    frame.occupied = true;
                    self.path.push(0usize);
                }
            }
        }
    }
}

fn push_events<'a>(events: &mut Vec<TreeEvent<'a>>, value: &'a Value) {
    match value {
        Value::Array(items) => {
            events.push(TreeEvent::ArrayBegin);
            for item in items {
                push_events(events, item);
            }
            events.push(TreeEvent::ArrayEnd);
        }
        Value::Object(members) => {
            events.push(TreeEvent::ObjectBegin);
            for (key, member) in members {
                events.push(TreeEvent::Key(key));
                push_events(events, member);
            }
            events.push(TreeEvent::ObjectEnd);
        }
        scalar => events.push(TreeEvent::Scalar(scalar)),
    }
}
