//! JSON parsing tool (json_pt) is a library to parse JSON text into a packed parse index ([ParseIndex]) and to work with the extracted value tree ([Value]).
//!
//! # Overview
//! Most JSON libraries materialize a full value tree for every document even when the caller
//! only needs a handful of fields. To reduce that cost, parsing is split into two phases.
//! The first phase produces a [ParseIndex]: a flat sequence of 64-bit node records over the
//! source text which stores *positions* instead of values. The index is cheap to build and
//! cheap to traverse, and a [Reader] can walk it directly with a current-path projection.
//! The second phase, [extract_tree](ParseIndex::extract_tree), is lazy and optional: it decodes
//! string spans and number literals only when the caller asks for the rich in-memory tree.
//!
//! The value tree is path-addressed ([Path]) and ships with its algorithmic toolbox:
//! structural [diff], rule-driven [merge], pre-order [traverse], numeric-finiteness
//! [validate] and a streaming [Encoder] for the compact and pretty textual forms.
//!
//! # Example
//!
//! ```
//! use json_pt::{diff, merge, ParseIndex, Path, RecursiveMergeRules, Value};
//!
//! // # Parsing
//!
//! let index = ParseIndex::parse(r#"{ "a": 1, "b": [2, 3.5, "x"] }"#);
//! assert!(index.success());
//! // One glyph per node record: document markers, structure, keys and leaves.
//! assert_eq!(index.to_string(), "^{kik[ids]}$");
//!
//! // # Extraction
//!
//! let tree = index.extract_tree().unwrap();
//! assert_eq!(tree.at_key("a").unwrap(), &Value::Integer(1));
//!
//! let b1 = Path::parse(".b[1]").unwrap();
//! assert_eq!(tree.at_path(&b1).unwrap(), &Value::Decimal(3.5));
//!
//! // # Algorithms
//!
//! let left = json_pt::parse(r#"{"a": {"x": 1}}"#).unwrap();
//! let right = json_pt::parse(r#"{"a": {"y": 2}, "b": 3}"#).unwrap();
//!
//! let merged = merge(&RecursiveMergeRules, [left.clone(), right.clone()]).unwrap();
//! assert_eq!(merged, json_pt::parse(r#"{"a": {"x": 1, "y": 2}, "b": 3}"#).unwrap());
//!
//! let split = diff(left, right);
//! assert_eq!(split.left, json_pt::parse(r#"{"a": {"x": 1}}"#).unwrap());
//!
//! // # Encoding
//!
//! // Compact, deterministic by sorted key order.
//! assert_eq!(merged.to_string(), r#"{"a":{"x":1,"y":2},"b":3}"#);
//! ```
//!
//! # License
//! [json_pt](crate) is provided under the MIT license.

pub mod algorithm;
mod buffer;
mod encode;
mod error;
mod parse_index;
mod path;
mod reader;
pub mod serialization;
mod strings;
mod tokenizer;
mod util;
mod value;

#[cfg(test)]
mod __tests__;

pub use algorithm::{
    diff, merge, merge_explicit, recompose, traverse, validate, DiffResult, DynamicMergeRules,
    MergeRules, RecursiveMergeRules, ThrowingMergeRules,
};
pub use buffer::SharedBuffer;
pub use encode::{encode, to_string_with_options, EncodeOptions, Encoder};
pub use error::{
    DuplicateTypeError, Error, ExtractionError, KindError, NoSuchElement, ParseError,
    ParseErrorCode, Problem, RangeError, ValidationError, ValidationErrorCode,
};
pub use parse_index::{
    AstNode, AstNodeType, DecimalNode, FailureMode, IntegerNode, NumberMode, ParseIndex,
    ParseIndexIter, ParseOptions, StringEncodingAction, StringNode,
};
pub use path::{Path, PathElement};
pub use reader::Reader;
pub use serialization::{
    extract, reset_demangle_function, set_demangle_function, DemangleFunction,
    DuplicateKeyAction, ExtractContext, ExtractOptions, Extractor, FnExtractor, Formats,
    IntegerOverflowAction, OnError, ProblemCollector, Version,
};
pub use tokenizer::{attempt_match, MatchResult, Token, TokenKind, TokenMatch, Tokenizer};
pub use util::{Code, Log, Position};
pub use value::{coerce, Array, Kind, Object, Value};

/// Parse `source` into a value tree with default options. Shorthand for
/// [ParseIndex::parse] followed by [extract_tree](ParseIndex::extract_tree).
pub fn parse(source: &str) -> Result<Value, ParseError> {
    ParseIndex::parse(source).extract_tree()
}

/// Parse `source` into a value tree with the given parse options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Value, ParseError> {
    ParseIndex::parse_with_options(source, options).extract_tree()
}
