use crate::path::Path;
use crate::value::Value;
use crate::util::Position;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Classification of a document or path syntax failure.
pub enum ParseErrorCode {
    UnexpectedToken,
    EofInString,
    BadEscape,
    BadNumber,
    DepthExceeded,
    DuplicateKey,
    InvalidUtf8,
    InvalidPath,
}

impl Display for ParseErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorCode::UnexpectedToken => write!(f, "unexpected_token"),
            ParseErrorCode::EofInString => write!(f, "eof_in_string"),
            ParseErrorCode::BadEscape => write!(f, "bad_escape"),
            ParseErrorCode::BadNumber => write!(f, "bad_number"),
            ParseErrorCode::DepthExceeded => write!(f, "depth_exceeded"),
            ParseErrorCode::DuplicateKey => write!(f, "duplicate_key"),
            ParseErrorCode::InvalidUtf8 => write!(f, "invalid_utf8"),
            ParseErrorCode::InvalidPath => write!(f, "invalid_path"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned when the tokenizer or the parser failed to consume the
/// JSON source because of a syntax error.
#[error("{code} at line {line} column {column} (offset {offset}): {message}")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub code: ParseErrorCode,
    pub message: String,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, offset: usize, position: Position, message: String) -> Self {
        Self {
            offset,
            line: position.line,
            column: position.column,
            code,
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned when a value is accessed as a kind it does not hold.
#[error("{message}")]
pub struct KindError {
    pub message: String,
}

impl KindError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned when a path, key or index resolution missed.
#[error("{message}")]
pub struct NoSuchElement {
    pub message: String,
}

impl NoSuchElement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned on out-of-range access to a container or shared buffer.
#[error("{message}")]
pub struct RangeError {
    pub message: String,
}

impl RangeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    NonFiniteNumber,
}

impl Display for ValidationErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorCode::NonFiniteNumber => write!(f, "non-finite number"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
/// An error returned from [validate](crate::algorithm::validate) with the
/// location and the offending value.
#[error("validation error: got {code} at path {path}: {value}")]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub path: Path,
    pub value: Value,
}

#[derive(Debug)]
/// Description of a single problem encountered while extracting.
pub struct Problem {
    path: Path,
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Problem {
    pub fn new(path: Path, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(
        path: Path,
        message: impl Into<String>,
        cause: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self {
            path,
            message: message.into(),
            cause: Some(cause),
        }
    }

    /// The path this problem was encountered at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable details about the encountered problem.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause of this problem, if one was recorded.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        self.cause.as_deref()
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "at {}: {}", self.path, self.message)
    }
}

#[derive(Debug)]
/// One or more problems raised while decoding JSON into user types.
///
/// The list always holds at least one problem; an empty input list is
/// replaced with a note about an unspecified error.
pub struct ExtractionError {
    problems: Vec<Problem>,
}

impl std::error::Error for ExtractionError {}

impl ExtractionError {
    pub fn new(problems: Vec<Problem>) -> Self {
        if problems.is_empty() {
            Self {
                problems: vec![Problem::new(Path::new(), "unspecified extraction error")],
            }
        } else {
            Self { problems }
        }
    }

    pub fn single(path: Path, message: impl Into<String>) -> Self {
        Self {
            problems: vec![Problem::new(path, message)],
        }
    }

    /// The path the first problem came from.
    pub fn path(&self) -> &Path {
        self.problems[0].path()
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl Display for ExtractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.problems.len() == 1 {
            write!(f, "extraction error {}", self.problems[0])
        } else {
            write!(f, "{} problems while extracting:", self.problems.len())?;
            for problem in &self.problems {
                write!(f, "\n  {}", problem)?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned when a second extractor is registered for a type which
/// already has one.
#[error("already have an extractor for type {type_name}")]
pub struct DuplicateTypeError {
    pub type_name: String,
}

impl DuplicateTypeError {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Error)]
/// The union of failures for operations which can miss in more than one way,
/// such as path resolution or merging.
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Kind(#[from] KindError),
    #[error(transparent)]
    NoSuchElement(#[from] NoSuchElement),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    DuplicateType(#[from] DuplicateTypeError),
    /// An operation was attempted on an object in the wrong state, such as
    /// reading from a reader that is no longer `good`.
    #[error("invalid state: {0}")]
    InvalidState(String),
}
