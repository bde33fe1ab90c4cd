use crate::buffer::SharedBuffer;
use crate::error::{ParseError, ParseErrorCode};
use crate::serialization::{DuplicateKeyAction, ExtractOptions, IntegerOverflowAction};
use crate::strings;
use crate::tokenizer::{attempt_match, MatchResult, TokenKind};
use crate::util::{Code, Log};
use crate::value::{Array, Object, Value};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

static IDENTIFIER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// What to do with invalid UTF-8 (and unpaired surrogate escapes) in string
/// bodies.
pub enum StringEncodingAction {
    /// Substitute U+FFFD for each offending sequence.
    ReplaceInvalid,
    /// Fail the decode with `invalid_utf8` / `bad_escape`.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Which number spellings the parser accepts.
pub enum NumberMode {
    /// RFC 8259 numbers only.
    Strict,
    /// Additionally accept `NaN`, `Infinity` and `-Infinity` as decimals.
    DecimalNanInfAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// How the parser reacts to a syntax error.
pub enum FailureMode {
    /// Emit an `error` node and halt.
    FailImmediately,
    /// Emit an `error` node and scan forward to the next structural
    /// delimiter at the current depth, then keep parsing.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Options controlling the document parser.
pub struct ParseOptions {
    pub string_encoding_action: StringEncodingAction,
    pub max_structure_depth: usize,
    pub allow_comments: bool,
    pub allow_trailing_comma: bool,
    pub allow_unquoted_keys: bool,
    pub numbers: NumberMode,
    pub failure_mode: FailureMode,
    /// Diagnostic print level for the parser, active in debug builds only.
    pub log: Log<&'static str>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            string_encoding_action: StringEncodingAction::ReplaceInvalid,
            max_structure_depth: 256,
            allow_comments: false,
            allow_trailing_comma: false,
            allow_unquoted_keys: false,
            numbers: NumberMode::Strict,
            failure_mode: FailureMode::FailImmediately,
            log: Log::None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options which accept nothing beyond RFC 8259 and fail on any invalid
    /// byte.
    pub fn strict() -> Self {
        Self {
            string_encoding_action: StringEncodingAction::Fail,
            ..Self::default()
        }
    }

    pub fn string_encoding_action(mut self, action: StringEncodingAction) -> Self {
        self.string_encoding_action = action;
        self
    }

    pub fn max_structure_depth(mut self, depth: usize) -> Self {
        self.max_structure_depth = depth;
        self
    }

    pub fn allow_comments(mut self, allow: bool) -> Self {
        self.allow_comments = allow;
        self
    }

    pub fn allow_trailing_comma(mut self, allow: bool) -> Self {
        self.allow_trailing_comma = allow;
        self
    }

    pub fn allow_unquoted_keys(mut self, allow: bool) -> Self {
        self.allow_unquoted_keys = allow;
        self
    }

    pub fn numbers(mut self, mode: NumberMode) -> Self {
        self.numbers = mode;
        self
    }

    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn log(mut self, label: Log<&'static str>) -> Self {
        self.log = label;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
/// The sixteen node types of the packed index, each rendered as a single
/// glyph in the [ParseIndex] dump.
pub enum AstNodeType {
    DocumentStart = 0,
    DocumentEnd = 1,
    ObjectBegin = 2,
    ObjectEnd = 3,
    ArrayBegin = 4,
    ArrayEnd = 5,
    StringCanonical = 6,
    StringEscaped = 7,
    KeyCanonical = 8,
    KeyEscaped = 9,
    LiteralTrue = 10,
    LiteralFalse = 11,
    LiteralNull = 12,
    Integer = 13,
    Decimal = 14,
    Error = 15,
}

impl AstNodeType {
    fn from_tag(tag: u8) -> AstNodeType {
        match tag {
            0 => AstNodeType::DocumentStart,
            1 => AstNodeType::DocumentEnd,
            2 => AstNodeType::ObjectBegin,
            3 => AstNodeType::ObjectEnd,
            4 => AstNodeType::ArrayBegin,
            5 => AstNodeType::ArrayEnd,
            6 => AstNodeType::StringCanonical,
            7 => AstNodeType::StringEscaped,
            8 => AstNodeType::KeyCanonical,
            9 => AstNodeType::KeyEscaped,
            10 => AstNodeType::LiteralTrue,
            11 => AstNodeType::LiteralFalse,
            12 => AstNodeType::LiteralNull,
            13 => AstNodeType::Integer,
            14 => AstNodeType::Decimal,
            _ => AstNodeType::Error,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            AstNodeType::DocumentStart => '^',
            AstNodeType::DocumentEnd => '$',
            AstNodeType::ObjectBegin => '{',
            AstNodeType::ObjectEnd => '}',
            AstNodeType::ArrayBegin => '[',
            AstNodeType::ArrayEnd => ']',
            AstNodeType::StringCanonical => 's',
            AstNodeType::StringEscaped => 'S',
            AstNodeType::KeyCanonical => 'k',
            AstNodeType::KeyEscaped => 'K',
            AstNodeType::LiteralTrue => 't',
            AstNodeType::LiteralFalse => 'f',
            AstNodeType::LiteralNull => 'n',
            AstNodeType::Integer => 'i',
            AstNodeType::Decimal => 'd',
            AstNodeType::Error => '!',
        }
    }

    pub fn is_key(self) -> bool {
        matches!(self, AstNodeType::KeyCanonical | AstNodeType::KeyEscaped)
    }

    pub fn is_begin(self) -> bool {
        matches!(self, AstNodeType::ObjectBegin | AstNodeType::ArrayBegin)
    }

    pub fn is_end(self) -> bool {
        matches!(self, AstNodeType::ObjectEnd | AstNodeType::ArrayEnd)
    }
}

impl Display for AstNodeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

#[derive(Debug, Clone, Copy)]
enum StringRepr<'a> {
    /// A span of the source buffer: `begin..end` covers the body (without
    /// the quotes for a quoted string).
    Source {
        source: &'a [u8],
        begin: usize,
        end: usize,
        escaped: bool,
    },
    /// Already-decoded text borrowed from a value tree.
    Decoded(&'a str),
}

#[derive(Debug, Clone, Copy)]
/// The payload of a string or key node.
pub struct StringNode<'a>(StringRepr<'a>);

impl<'a> StringNode<'a> {
    pub(crate) fn from_source(source: &'a [u8], begin: usize, end: usize, escaped: bool) -> Self {
        Self(StringRepr::Source {
            source,
            begin,
            end,
            escaped,
        })
    }

    pub(crate) fn decoded(text: &'a str) -> Self {
        Self(StringRepr::Decoded(text))
    }

    /// The raw body bytes as they appear in the source (escapes intact).
    pub fn raw(&self) -> &'a [u8] {
        match self.0 {
            StringRepr::Source {
                source, begin, end, ..
            } => &source[begin..end],
            StringRepr::Decoded(text) => text.as_bytes(),
        }
    }

    pub fn is_escaped(&self) -> bool {
        match self.0 {
            StringRepr::Source { escaped, .. } => escaped,
            StringRepr::Decoded(_) => false,
        }
    }

    /// The decoded text. Canonical spans of valid UTF-8 borrow zero-copy;
    /// escaped spans allocate.
    pub fn decode(&self) -> Result<Cow<'a, str>, ParseError> {
        self.decode_with(StringEncodingAction::ReplaceInvalid)
    }

    pub fn decode_with(&self, action: StringEncodingAction) -> Result<Cow<'a, str>, ParseError> {
        match self.0 {
            StringRepr::Decoded(text) => Ok(Cow::Borrowed(text)),
            StringRepr::Source {
                source,
                begin,
                end,
                escaped,
            } => {
                let raw = &source[begin..end];
                if !escaped {
                    if let Ok(text) = std::str::from_utf8(raw) {
                        return Ok(Cow::Borrowed(text));
                    }
                }
                let code = Code::new(source);
                strings::decode_string_body(raw, action, &code, begin).map(Cow::Owned)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum IntegerRepr<'a> {
    Source { source: &'a [u8], begin: usize, end: usize },
    Parsed(i64),
}

#[derive(Debug, Clone, Copy)]
/// The payload of an integer node. The literal is parsed on demand, so a
/// value exceeding the `i64` range surfaces as an error at access time and
/// extraction can apply its overflow policy.
pub struct IntegerNode<'a>(IntegerRepr<'a>);

impl<'a> IntegerNode<'a> {
    pub(crate) fn from_source(source: &'a [u8], begin: usize, end: usize) -> Self {
        Self(IntegerRepr::Source { source, begin, end })
    }

    pub(crate) fn parsed(value: i64) -> Self {
        Self(IntegerRepr::Parsed(value))
    }

    pub fn value(&self) -> Result<i64, ParseError> {
        match self.0 {
            IntegerRepr::Parsed(value) => Ok(value),
            IntegerRepr::Source { source, begin, end } => {
                let text = std::str::from_utf8(&source[begin..end]).expect("number is ASCII");
                text.parse().map_err(|_| {
                    ParseError::new(
                        ParseErrorCode::BadNumber,
                        begin,
                        Code::new(source).obtain_position(begin),
                        format!("integer literal {} does not fit in 64 bits", text),
                    )
                })
            }
        }
    }

    /// The literal widened to a decimal; never fails.
    pub fn as_decimal(&self) -> f64 {
        match self.0 {
            IntegerRepr::Parsed(value) => value as f64,
            IntegerRepr::Source { source, begin, end } => {
                std::str::from_utf8(&source[begin..end])
                    .expect("number is ASCII")
                    .parse()
                    .expect("matched number grammar")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DecimalRepr<'a> {
    Source { source: &'a [u8], begin: usize, end: usize },
    Parsed(f64),
}

#[derive(Debug, Clone, Copy)]
/// The payload of a decimal node.
pub struct DecimalNode<'a>(DecimalRepr<'a>);

impl<'a> DecimalNode<'a> {
    pub(crate) fn from_source(source: &'a [u8], begin: usize, end: usize) -> Self {
        Self(DecimalRepr::Source { source, begin, end })
    }

    pub(crate) fn parsed(value: f64) -> Self {
        Self(DecimalRepr::Parsed(value))
    }

    pub fn value(&self) -> f64 {
        match self.0 {
            DecimalRepr::Parsed(value) => value,
            DecimalRepr::Source { source, begin, end } => {
                let text = std::str::from_utf8(&source[begin..end]).expect("number is ASCII");
                match text {
                    "NaN" => f64::NAN,
                    "Infinity" => f64::INFINITY,
                    "-Infinity" => f64::NEG_INFINITY,
                    other => other.parse().expect("matched number grammar"),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
/// A projection of one node of the packed index (or of a value tree walked
/// through a [Reader](crate::Reader)).
pub enum AstNode<'a> {
    DocumentStart,
    DocumentEnd,
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
    StringCanonical(StringNode<'a>),
    StringEscaped(StringNode<'a>),
    KeyCanonical(StringNode<'a>),
    KeyEscaped(StringNode<'a>),
    LiteralTrue,
    LiteralFalse,
    LiteralNull,
    Integer(IntegerNode<'a>),
    Decimal(DecimalNode<'a>),
    /// The byte offset at which parsing failed.
    Error(usize),
}

impl<'a> AstNode<'a> {
    pub fn node_type(&self) -> AstNodeType {
        match self {
            AstNode::DocumentStart => AstNodeType::DocumentStart,
            AstNode::DocumentEnd => AstNodeType::DocumentEnd,
            AstNode::ObjectBegin => AstNodeType::ObjectBegin,
            AstNode::ObjectEnd => AstNodeType::ObjectEnd,
            AstNode::ArrayBegin => AstNodeType::ArrayBegin,
            AstNode::ArrayEnd => AstNodeType::ArrayEnd,
            AstNode::StringCanonical(_) => AstNodeType::StringCanonical,
            AstNode::StringEscaped(_) => AstNodeType::StringEscaped,
            AstNode::KeyCanonical(_) => AstNodeType::KeyCanonical,
            AstNode::KeyEscaped(_) => AstNodeType::KeyEscaped,
            AstNode::LiteralTrue => AstNodeType::LiteralTrue,
            AstNode::LiteralFalse => AstNodeType::LiteralFalse,
            AstNode::LiteralNull => AstNodeType::LiteralNull,
            AstNode::Integer(_) => AstNodeType::Integer,
            AstNode::Decimal(_) => AstNodeType::Decimal,
            AstNode::Error(_) => AstNodeType::Error,
        }
    }

    /// The string payload of a string or key node.
    pub fn as_string_node(&self) -> Option<&StringNode<'a>> {
        match self {
            AstNode::StringCanonical(node)
            | AstNode::StringEscaped(node)
            | AstNode::KeyCanonical(node)
            | AstNode::KeyEscaped(node) => Some(node),
            _ => None,
        }
    }
}

const TAG_BITS: u32 = 4;
const TAG_MASK: u64 = (1 << TAG_BITS) - 1;

fn pack(node_type: AstNodeType, offset: usize) -> u64 {
    ((offset as u64) << TAG_BITS) | node_type as u64
}

fn unpack(record: u64) -> (AstNodeType, usize) {
    (
        AstNodeType::from_tag((record & TAG_MASK) as u8),
        (record >> TAG_BITS) as usize,
    )
}

/// The packed index of a parsed JSON document.
///
/// The index holds the source text (as a [SharedBuffer]) and a flat sequence
/// of 64-bit node records, each a node type plus the byte offset of its
/// token. Values are not materialized: strings stay as source spans until
/// [extract_tree](ParseIndex::extract_tree) or a
/// [Reader](crate::Reader) asks for them.
///
/// ```
/// use json_pt::ParseIndex;
///
/// let index = ParseIndex::parse(r#"{ "a": [1, 2] }"#);
/// assert!(index.success());
/// assert_eq!(index.to_string(), "^{k[ii]}$");
/// ```
pub struct ParseIndex {
    source: SharedBuffer,
    options: ParseOptions,
    nodes: Vec<u64>,
    errors: Vec<ParseError>,
}

impl ParseIndex {
    /// Parse `source` with default options.
    pub fn parse(source: impl Into<SharedBuffer>) -> ParseIndex {
        Self::parse_with_options(source, &ParseOptions::default())
    }

    pub fn parse_with_options(
        source: impl Into<SharedBuffer>,
        options: &ParseOptions,
    ) -> ParseIndex {
        let source = source.into();
        let (nodes, errors) = {
            let mut parser = Parser::new(source.as_slice(), options);
            parser.run();
            (parser.nodes, parser.errors)
        };
        ParseIndex {
            source,
            options: options.clone(),
            nodes,
            errors,
        }
    }

    /// Whether the source parsed without any error node and with balanced
    /// structure. Even a successful index can fail extraction later, e.g. an
    /// integer literal outside the 64-bit range.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
            && self
                .nodes
                .last()
                .map_or(false, |record| unpack(*record).0 == AstNodeType::DocumentEnd)
    }

    /// Validate that the parse was a success, returning the first recorded
    /// failure otherwise.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.success() {
            return Ok(());
        }
        Err(self.errors.first().cloned().unwrap_or_else(|| {
            let at = self.source.len();
            ParseError::new(
                ParseErrorCode::UnexpectedToken,
                at,
                Code::new(self.source.as_slice()).obtain_position(at),
                "document is incomplete".to_owned(),
            )
        }))
    }

    /// Every parse failure recorded while building this index. Holds more
    /// than one element only in [FailureMode::Ignore].
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn source(&self) -> &SharedBuffer {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> ParseIndexIter<'_> {
        ParseIndexIter {
            index: self,
            position: 0,
        }
    }

    pub(crate) fn node_at(&self, position: usize) -> Option<AstNode<'_>> {
        let record = *self.nodes.get(position)?;
        Some(self.project(record))
    }

    fn project(&self, record: u64) -> AstNode<'_> {
        let source = self.source.as_slice();
        let (node_type, offset) = unpack(record);
        match node_type {
            AstNodeType::DocumentStart => AstNode::DocumentStart,
            AstNodeType::DocumentEnd => AstNode::DocumentEnd,
            AstNodeType::ObjectBegin => AstNode::ObjectBegin,
            AstNodeType::ObjectEnd => AstNode::ObjectEnd,
            AstNodeType::ArrayBegin => AstNode::ArrayBegin,
            AstNodeType::ArrayEnd => AstNode::ArrayEnd,
            AstNodeType::LiteralTrue => AstNode::LiteralTrue,
            AstNodeType::LiteralFalse => AstNode::LiteralFalse,
            AstNodeType::LiteralNull => AstNode::LiteralNull,
            AstNodeType::Error => AstNode::Error(offset),
            AstNodeType::StringCanonical
            | AstNodeType::StringEscaped
            | AstNodeType::KeyCanonical
            | AstNodeType::KeyEscaped => {
                let m = attempt_match(&source[offset..]);
                let node = if source[offset] == b'"' {
                    // quoted: strip the delimiters
                    StringNode::from_source(
                        source,
                        offset + 1,
                        offset + m.length - 1,
                        m.escaped,
                    )
                } else {
                    // unquoted key
                    StringNode::from_source(source, offset, offset + m.length, false)
                };
                match node_type {
                    AstNodeType::StringCanonical => AstNode::StringCanonical(node),
                    AstNodeType::StringEscaped => AstNode::StringEscaped(node),
                    AstNodeType::KeyCanonical => AstNode::KeyCanonical(node),
                    _ => AstNode::KeyEscaped(node),
                }
            }
            AstNodeType::Integer => {
                let m = attempt_match(&source[offset..]);
                AstNode::Integer(IntegerNode::from_source(source, offset, offset + m.length))
            }
            AstNodeType::Decimal => {
                let m = attempt_match(&source[offset..]);
                AstNode::Decimal(DecimalNode::from_source(source, offset, offset + m.length))
            }
        }
    }

    /// Materialize the value tree with default extraction options.
    pub fn extract_tree(&self) -> Result<Value, ParseError> {
        self.extract_tree_with_options(&ExtractOptions::default())
    }

    /// Materialize the value tree. Escaped spans run the string decoder;
    /// canonical spans are copied verbatim. Duplicate keys and integer
    /// overflow honor the respective actions in `options`.
    pub fn extract_tree_with_options(
        &self,
        options: &ExtractOptions,
    ) -> Result<Value, ParseError> {
        self.validate()?;

        enum Frame {
            Array(Array),
            Object(Object, Option<(String, usize)>),
        }

        let source = self.source.as_slice();
        let code = Code::new(source);
        let mut stack: Vec<Frame> = Vec::new();
        let mut result: Option<Value> = None;

        let mut place = |stack: &mut Vec<Frame>, value: Value| -> Result<(), ParseError> {
            match stack.last_mut() {
                None => result = Some(value),
                Some(Frame::Array(items)) => items.push_back(value),
                Some(Frame::Object(members, pending)) => {
                    let (key, key_offset) =
                        pending.take().expect("value inside an object follows a key");
                    match options.on_duplicate_key {
                        DuplicateKeyAction::Replace => {
                            members.insert(key, value);
                        }
                        DuplicateKeyAction::Ignore => {
                            if !members.contains_key(&key) {
                                members.insert(key, value);
                            }
                        }
                        DuplicateKeyAction::Fail => {
                            if members.contains_key(&key) {
                                return Err(ParseError::new(
                                    ParseErrorCode::DuplicateKey,
                                    key_offset,
                                    code.obtain_position(key_offset),
                                    format!("duplicate object key {:?}", key),
                                ));
                            }
                            members.insert(key, value);
                        }
                    }
                }
            }
            Ok(())
        };

        for record in &self.nodes {
            let (_, offset) = unpack(*record);
            match self.project(*record) {
                AstNode::DocumentStart | AstNode::DocumentEnd => {}
                AstNode::ObjectBegin => stack.push(Frame::Object(Object::new(), None)),
                AstNode::ArrayBegin => stack.push(Frame::Array(Array::new())),
                AstNode::ObjectEnd => {
                    match stack.pop() {
                        Some(Frame::Object(members, _)) => {
                            place(&mut stack, Value::Object(members))?
                        }
                        _ => unreachable!("validated index is balanced"),
                    };
                }
                AstNode::ArrayEnd => {
                    match stack.pop() {
                        Some(Frame::Array(items)) => place(&mut stack, Value::Array(items))?,
                        _ => unreachable!("validated index is balanced"),
                    };
                }
                AstNode::KeyCanonical(node) | AstNode::KeyEscaped(node) => {
                    let key = node
                        .decode_with(self.options.string_encoding_action)?
                        .into_owned();
                    match stack.last_mut() {
                        Some(Frame::Object(_, pending)) => *pending = Some((key, offset)),
                        _ => unreachable!("key outside an object in a validated index"),
                    }
                }
                AstNode::StringCanonical(node) | AstNode::StringEscaped(node) => {
                    let text = node
                        .decode_with(self.options.string_encoding_action)?
                        .into_owned();
                    place(&mut stack, Value::String(text))?;
                }
                AstNode::LiteralTrue => place(&mut stack, Value::Boolean(true))?,
                AstNode::LiteralFalse => place(&mut stack, Value::Boolean(false))?,
                AstNode::LiteralNull => place(&mut stack, Value::Null)?,
                AstNode::Integer(node) => {
                    let value = match node.value() {
                        Ok(value) => Value::Integer(value),
                        Err(overflow) => match options.on_integer_overflow {
                            IntegerOverflowAction::Fail => return Err(overflow),
                            IntegerOverflowAction::CoerceDecimal => {
                                Value::Decimal(node.as_decimal())
                            }
                        },
                    };
                    place(&mut stack, value)?;
                }
                AstNode::Decimal(node) => place(&mut stack, Value::Decimal(node.value()))?,
                AstNode::Error(_) => unreachable!("validated index holds no error node"),
            }
        }

        Ok(result.unwrap_or(Value::Null))
    }
}

impl Display for ParseIndex {
    /// The glyph dump of the node sequence, e.g. `^{k[ii]}$`. This exists
    /// primarily for debugging.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for record in &self.nodes {
            write!(f, "{}", unpack(*record).0.glyph())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ParseIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseIndex")
            .field("nodes", &self.to_string())
            .field("errors", &self.errors)
            .finish()
    }
}

/// A forward-only iterator over the node records of a [ParseIndex].
pub struct ParseIndexIter<'a> {
    index: &'a ParseIndex,
    position: usize,
}

impl<'a> Iterator for ParseIndexIter<'a> {
    type Item = AstNode<'a>;

    fn next(&mut self) -> Option<AstNode<'a>> {
        let record = *self.index.nodes.get(self.position)?;
        self.position += 1;
        Some(self.index.project(record))
    }
}

impl<'a> IntoIterator for &'a ParseIndex {
    type Item = AstNode<'a>;
    type IntoIter = ParseIndexIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

////////////////////////////////////////////////////////////////////////////
// Parser
////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// A value is required (document top, after `:` or after `,` in an
    /// array).
    Value,
    /// Right after `[`: a value or an immediate `]`.
    ArrayValueFirst,
    /// After `,` in an array: a value, or `]` when trailing commas are
    /// allowed.
    ArrayValueNext,
    ArrayCommaOrEnd,
    /// Right after `{`: a key or an immediate `}`.
    ObjectKeyFirst,
    /// After `,` in an object: a key, or `}` when trailing commas are
    /// allowed.
    ObjectKeyNext,
    ObjectColon,
    ObjectCommaOrEnd,
    /// The top-level value is complete; only EOF may follow.
    Done,
}

struct Tok {
    kind: TokenKind,
    result: MatchResult,
    begin: usize,
    end: usize,
    decimal: bool,
    escaped: bool,
}

struct Parser<'s, 'o> {
    source: &'s [u8],
    code: Code<'s>,
    options: &'o ParseOptions,
    position: usize,
    nodes: Vec<u64>,
    errors: Vec<ParseError>,
    stack: Vec<Container>,
    state: State,
    halted: bool,
}

impl<'s, 'o> Parser<'s, 'o> {
    fn new(source: &'s [u8], options: &'o ParseOptions) -> Self {
        Self {
            source,
            code: Code::new(source),
            options,
            position: 0,
            nodes: Vec::with_capacity(source.len() / 4 + 2),
            errors: Vec::new(),
            stack: Vec::new(),
            state: State::Value,
            halted: false,
        }
    }

    fn emit(&mut self, node_type: AstNodeType, offset: usize) {
        self.nodes.push(pack(node_type, offset));
    }

    /// The next token with whitespace (and, when allowed, comments) skipped.
    /// `None` at end of input.
    fn next_tok(&mut self) -> Option<Tok> {
        loop {
            if self.position >= self.source.len() {
                return None;
            }
            let begin = self.position;
            let m = attempt_match(&self.source[begin..]);
            match m.result {
                MatchResult::Complete | MatchResult::CompleteEof => {
                    self.position += m.length;
                    if m.kind == TokenKind::WHITESPACE {
                        continue;
                    }
                    if m.kind == TokenKind::COMMENT && self.options.allow_comments {
                        continue;
                    }
                    return Some(Tok {
                        kind: m.kind,
                        result: m.result,
                        begin,
                        end: self.position,
                        decimal: m.decimal,
                        escaped: m.escaped,
                    });
                }
                MatchResult::IncompleteEof => {
                    self.position = self.source.len();
                    return Some(Tok {
                        kind: m.kind,
                        result: m.result,
                        begin,
                        end: self.position,
                        decimal: m.decimal,
                        escaped: m.escaped,
                    });
                }
                MatchResult::Unmatched => {
                    let length = m.length.max(1);
                    self.position = (begin + length).min(self.source.len());
                    return Some(Tok {
                        kind: m.kind,
                        result: m.result,
                        begin,
                        end: self.position,
                        decimal: m.decimal,
                        escaped: m.escaped,
                    });
                }
            }
        }
    }

    fn text(&self, tok: &Tok) -> &'s [u8] {
        &self.source[tok.begin..tok.end]
    }

    fn run(&mut self) {
        self.emit(AstNodeType::DocumentStart, 0);

        #[cfg(debug_assertions)]
        let log = self.options.log;

        while !self.halted {
            let tok = match self.next_tok() {
                Some(tok) => tok,
                None => break,
            };

            #[cfg(debug_assertions)]
            if log.enabled(Log::Verbose(())) {
                println!(
                    "[{}] {:?} token {} at {}",
                    log,
                    self.state,
                    tok.kind,
                    self.code.obtain_position(tok.begin)
                );
            }

            self.dispatch(tok);
        }

        if self.halted {
            return;
        }

        if self.state != State::Done || !self.stack.is_empty() {
            let at = self.source.len();
            self.record_error(
                ParseErrorCode::UnexpectedToken,
                at,
                "unexpected end of input".to_owned(),
            );
            if self.halted {
                return;
            }
        }
        self.emit(AstNodeType::DocumentEnd, self.source.len());
    }

    fn dispatch(&mut self, tok: Tok) {
        // Failed tokens are reported before state handling, except that a
        // scanned word can still serve as an unquoted object key.
        if tok.result == MatchResult::IncompleteEof || tok.result == MatchResult::Unmatched {
            if self.is_key_state() && self.accept_unquoted_key(&tok) {
                return;
            }
            return self.token_error(&tok);
        }

        match self.state {
            State::Value | State::ArrayValueFirst | State::ArrayValueNext => self.on_value(tok),
            State::ArrayCommaOrEnd => match tok.kind {
                TokenKind::SEPARATOR => self.state = State::ArrayValueNext,
                TokenKind::ARRAY_END => self.close(Container::Array, &tok),
                _ => self.unexpected(&tok, "expected `,` or `]`"),
            },
            State::ObjectKeyFirst | State::ObjectKeyNext => self.on_key(tok),
            State::ObjectColon => match tok.kind {
                TokenKind::OBJECT_KEY_DELIMITER => self.state = State::Value,
                _ => self.unexpected(&tok, "expected `:`"),
            },
            State::ObjectCommaOrEnd => match tok.kind {
                TokenKind::SEPARATOR => self.state = State::ObjectKeyNext,
                TokenKind::OBJECT_END => self.close(Container::Object, &tok),
                _ => self.unexpected(&tok, "expected `,` or `}`"),
            },
            State::Done => self.unexpected(&tok, "trailing content after the document"),
        }
    }

    fn is_key_state(&self) -> bool {
        matches!(self.state, State::ObjectKeyFirst | State::ObjectKeyNext)
    }

    fn on_value(&mut self, tok: Tok) {
        match tok.kind {
            TokenKind::STRING => {
                let node_type = if tok.escaped {
                    AstNodeType::StringEscaped
                } else {
                    AstNodeType::StringCanonical
                };
                self.emit(node_type, tok.begin);
                self.state = self.after_value();
            }
            TokenKind::NUMBER => {
                let text = self.text(&tok);
                let non_finite = text[0] == b'N'
                    || text[0] == b'I'
                    || (text[0] == b'-' && text.get(1) == Some(&b'I'));
                if non_finite && self.options.numbers == NumberMode::Strict {
                    return self.record_error(
                        ParseErrorCode::BadNumber,
                        tok.begin,
                        "non-finite numbers are not allowed".to_owned(),
                    );
                }
                let node_type = if tok.decimal {
                    AstNodeType::Decimal
                } else {
                    AstNodeType::Integer
                };
                self.emit(node_type, tok.begin);
                self.state = self.after_value();
            }
            TokenKind::BOOLEAN => {
                let node_type = if self.text(&tok) == &b"true"[..] {
                    AstNodeType::LiteralTrue
                } else {
                    AstNodeType::LiteralFalse
                };
                self.emit(node_type, tok.begin);
                self.state = self.after_value();
            }
            TokenKind::NULL => {
                self.emit(AstNodeType::LiteralNull, tok.begin);
                self.state = self.after_value();
            }
            TokenKind::OBJECT_BEGIN => self.open(Container::Object, &tok),
            TokenKind::ARRAY_BEGIN => self.open(Container::Array, &tok),
            TokenKind::ARRAY_END
                if self.state == State::ArrayValueFirst
                    || (self.state == State::ArrayValueNext
                        && self.options.allow_trailing_comma) =>
            {
                self.close(Container::Array, &tok)
            }
            _ => self.unexpected(&tok, "expected a value"),
        }
    }

    fn on_key(&mut self, tok: Tok) {
        match tok.kind {
            TokenKind::STRING => {
                let node_type = if tok.escaped {
                    AstNodeType::KeyEscaped
                } else {
                    AstNodeType::KeyCanonical
                };
                self.emit(node_type, tok.begin);
                self.state = State::ObjectColon;
            }
            TokenKind::OBJECT_END
                if self.state == State::ObjectKeyFirst
                    || self.options.allow_trailing_comma =>
            {
                self.close(Container::Object, &tok)
            }
            TokenKind::BOOLEAN | TokenKind::NULL | TokenKind::NUMBER => {
                if !self.accept_unquoted_key(&tok) {
                    self.unexpected(&tok, "expected an object key");
                }
            }
            _ => self.unexpected(&tok, "expected an object key"),
        }
    }

    /// Treat a scanned word as a key when unquoted keys are enabled and the
    /// word matches the identifier pattern.
    fn accept_unquoted_key(&mut self, tok: &Tok) -> bool {
        if !self.options.allow_unquoted_keys {
            return false;
        }
        if !IDENTIFIER_KEY.is_match(self.text(tok)) {
            return false;
        }
        self.emit(AstNodeType::KeyCanonical, tok.begin);
        self.state = State::ObjectColon;
        true
    }

    fn open(&mut self, container: Container, tok: &Tok) {
        if self.stack.len() + 1 > self.options.max_structure_depth {
            return self.record_error(
                ParseErrorCode::DepthExceeded,
                tok.begin,
                format!(
                    "structure depth exceeds the maximum of {}",
                    self.options.max_structure_depth
                ),
            );
        }
        self.stack.push(container);
        match container {
            Container::Array => {
                self.emit(AstNodeType::ArrayBegin, tok.begin);
                self.state = State::ArrayValueFirst;
            }
            Container::Object => {
                self.emit(AstNodeType::ObjectBegin, tok.begin);
                self.state = State::ObjectKeyFirst;
            }
        }
    }

    fn close(&mut self, container: Container, tok: &Tok) {
        debug_assert_eq!(self.stack.last(), Some(&container));
        self.stack.pop();
        match container {
            Container::Array => self.emit(AstNodeType::ArrayEnd, tok.begin),
            Container::Object => self.emit(AstNodeType::ObjectEnd, tok.begin),
        }
        self.state = self.after_value();
    }

    fn after_value(&self) -> State {
        match self.stack.last() {
            Some(Container::Array) => State::ArrayCommaOrEnd,
            Some(Container::Object) => State::ObjectCommaOrEnd,
            None => State::Done,
        }
    }

    fn token_error(&mut self, tok: &Tok) {
        let (code, message) = match (tok.result, tok.kind.base()) {
            (MatchResult::IncompleteEof, TokenKind::STRING) => (
                ParseErrorCode::EofInString,
                "unexpected end of input in string".to_owned(),
            ),
            (MatchResult::IncompleteEof, _) => (
                ParseErrorCode::UnexpectedToken,
                "unexpected end of input in token".to_owned(),
            ),
            (_, TokenKind::NUMBER) => (
                ParseErrorCode::BadNumber,
                "malformed number literal".to_owned(),
            ),
            (_, TokenKind::STRING) => (
                ParseErrorCode::BadEscape,
                "invalid character or escape in string".to_owned(),
            ),
            _ => (
                ParseErrorCode::UnexpectedToken,
                format!("no token matches input starting with {:?}", self.text(tok)),
            ),
        };
        self.record_error(code, tok.begin, message);
    }

    fn unexpected(&mut self, tok: &Tok, expectation: &str) {
        self.record_error(
            ParseErrorCode::UnexpectedToken,
            tok.begin,
            format!("unexpected {} token: {}", tok.kind, expectation),
        );
    }

    fn record_error(&mut self, code: ParseErrorCode, offset: usize, message: String) {
        #[cfg(debug_assertions)]
        if self.options.log.enabled(Log::Default(())) {
            println!(
                "[{}] {} at {}: {}",
                self.options.log,
                code,
                self.code.obtain_position(offset),
                message
            );
        }

        self.errors
            .push(ParseError::new(code, offset, self.code.obtain_position(offset), message));
        self.emit(AstNodeType::Error, offset);
        match self.options.failure_mode {
            FailureMode::FailImmediately => self.halted = true,
            FailureMode::Ignore => self.recover(),
        }
    }

    /// Scan forward to the next structural delimiter at the current depth: a
    /// separator resumes the current container, a closing bracket is left
    /// for the state machine to consume.
    fn recover(&mut self) {
        let mut depth = 0usize;
        loop {
            let checkpoint = self.position;
            let tok = match self.next_tok() {
                Some(tok) => tok,
                None => {
                    self.state = self.after_value();
                    return;
                }
            };
            match tok.kind.base() {
                TokenKind::ARRAY_BEGIN | TokenKind::OBJECT_BEGIN => depth += 1,
                TokenKind::ARRAY_END | TokenKind::OBJECT_END => {
                    if depth == 0 {
                        self.position = checkpoint;
                        self.state = self.after_value();
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::SEPARATOR if depth == 0 => {
                    self.state = match self.stack.last() {
                        Some(Container::Array) => State::ArrayValueNext,
                        Some(Container::Object) => State::ObjectKeyNext,
                        None => State::Done,
                    };
                    return;
                }
                _ => {}
            }
        }
    }
}
