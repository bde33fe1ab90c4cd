use crate::error::{ParseError, ParseErrorCode};
use crate::parse_index::StringEncodingAction;
use crate::strings;
use crate::tokenizer::{attempt_match, MatchResult, TokenKind};
use crate::util::Code;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fmt::{Display, Formatter};
use std::ops::{Add, AddAssign};

/// Keys matching this pattern render in the `.identifier` form; all other
/// keys use the `["…"]` form.
static SIMPLE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// One step of a [Path]: an array index or an object key.
pub enum PathElement {
    Index(usize),
    Key(String),
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}
impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::Key(key.to_owned())
    }
}
impl From<String> for PathElement {
    fn from(key: String) -> Self {
        PathElement::Key(key)
    }
}

impl Display for PathElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathElement::Index(index) => write!(f, "[{}]", index),
            PathElement::Key(key) => {
                if SIMPLE_KEY.is_match(key.as_bytes()) {
                    write!(f, ".{}", key)
                } else {
                    write!(f, "[\"")?;
                    strings::write_escaped(f, key, false)?;
                    write!(f, "\"]")
                }
            }
        }
    }
}

/// An ordered sequence of [PathElement]s addressing a location in a value
/// tree.
///
/// The textual form is `.` for the root, `.identifier` for simple keys,
/// `["…"]` for arbitrary keys (JSON string literal syntax) and `[N]` for
/// array indices. A path whose keys are all simple identifiers re-parses to
/// an equal path from its own rendering.
///
/// ```
/// use json_pt::Path;
///
/// let path = Path::parse(".a[0].b").unwrap();
/// assert_eq!(path.to_string(), ".a[0].b");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// The root path (no elements).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a path from its textual form. Any shape outside the path
    /// grammar fails with an [InvalidPath](crate::ParseErrorCode::InvalidPath)
    /// error locating the offending byte.
    pub fn parse(specification: &str) -> Result<Path, ParseError> {
        if specification == "." {
            return Ok(Path::new());
        }

        let bytes = specification.as_bytes();
        let code = Code::new(bytes);
        let invalid = |at: usize| {
            ParseError::new(
                ParseErrorCode::InvalidPath,
                at,
                code.obtain_position(at),
                format!(
                    "invalid path specification {:?}: syntax error at offset {}",
                    specification, at
                ),
            )
        };

        let mut out = Path::new();
        let mut pos = 0;
        while pos < bytes.len() {
            match bytes[pos] {
                b'.' => {
                    static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
                        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*").expect("valid pattern")
                    });
                    let found = IDENTIFIER
                        .find(&bytes[pos + 1..])
                        .ok_or_else(|| invalid(pos))?;
                    let key = std::str::from_utf8(found.as_bytes()).expect("ASCII identifier");
                    out.push(key);
                    pos += 1 + found.end();
                }
                b'[' if bytes.get(pos + 1) == Some(&b'"') => {
                    let m = attempt_match(&bytes[pos + 1..]);
                    if m.kind != TokenKind::STRING || m.result != MatchResult::Complete {
                        return Err(invalid(pos));
                    }
                    if bytes.get(pos + 1 + m.length) != Some(&b']') {
                        return Err(invalid(pos));
                    }
                    let body = &bytes[pos + 2..pos + m.length];
                    let key = strings::decode_string_body(
                        body,
                        StringEncodingAction::Fail,
                        &code,
                        pos + 2,
                    )?;
                    out.push(key);
                    pos += m.length + 2;
                }
                b'[' => {
                    let m = attempt_match(&bytes[pos + 1..]);
                    if m.kind != TokenKind::NUMBER
                        || m.result != MatchResult::Complete
                        || m.decimal
                        || bytes[pos + 1] == b'-'
                    {
                        return Err(invalid(pos));
                    }
                    if bytes.get(pos + 1 + m.length) != Some(&b']') {
                        return Err(invalid(pos));
                    }
                    let digits = std::str::from_utf8(&bytes[pos + 1..pos + 1 + m.length])
                        .expect("ASCII digits");
                    let index: usize = digits.parse().map_err(|_| invalid(pos + 1))?;
                    out.push(index);
                    pos += m.length + 2;
                }
                _ => return Err(invalid(pos)),
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathElement> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.elements.iter()
    }

    pub fn push(&mut self, element: impl Into<PathElement>) {
        self.elements.push(element.into());
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut PathElement> {
        self.elements.last_mut()
    }

    /// A copy extended by one element.
    pub fn child(&self, element: impl Into<PathElement>) -> Path {
        let mut out = self.clone();
        out.push(element);
        out
    }

    /// The path made of the first `len` elements.
    pub fn prefix(&self, len: usize) -> Path {
        Path {
            elements: self.elements[..len.min(self.elements.len())].to_vec(),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.elements.is_empty() {
            return write!(f, ".");
        }
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl From<Vec<PathElement>> for Path {
    fn from(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl AddAssign<PathElement> for Path {
    fn add_assign(&mut self, element: PathElement) {
        self.push(element);
    }
}

impl Add<PathElement> for Path {
    type Output = Path;
    fn add(mut self, element: PathElement) -> Path {
        self.push(element);
        self
    }
}

impl Add<&str> for Path {
    type Output = Path;
    fn add(mut self, key: &str) -> Path {
        self.push(key);
        self
    }
}

impl Add<usize> for Path {
    type Output = Path;
    fn add(mut self, index: usize) -> Path {
        self.push(index);
        self
    }
}

impl AddAssign<&Path> for Path {
    fn add_assign(&mut self, subpath: &Path) {
        self.elements.extend(subpath.elements.iter().cloned());
    }
}

impl Add<&Path> for Path {
    type Output = Path;
    fn add(mut self, subpath: &Path) -> Path {
        self += subpath;
        self
    }
}
