use std::fmt::{Debug, Display, Formatter};
use std::ops::{BitAnd, BitOr};

/// The lexical class of a JSON token.
///
/// Kinds are bits so that a partially-recognized token can be reported as its
/// kind OR-combined with [PARSE_ERROR_INDICATOR](TokenKind::PARSE_ERROR_INDICATOR).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenKind(u16);

impl TokenKind {
    pub const UNKNOWN: TokenKind = TokenKind(0x0000);
    pub const ARRAY_BEGIN: TokenKind = TokenKind(1 << 0);
    pub const ARRAY_END: TokenKind = TokenKind(1 << 1);
    pub const BOOLEAN: TokenKind = TokenKind(1 << 2);
    pub const NULL: TokenKind = TokenKind(1 << 3);
    pub const NUMBER: TokenKind = TokenKind(1 << 4);
    pub const SEPARATOR: TokenKind = TokenKind(1 << 5);
    pub const STRING: TokenKind = TokenKind(1 << 6);
    pub const OBJECT_BEGIN: TokenKind = TokenKind(1 << 7);
    pub const OBJECT_KEY_DELIMITER: TokenKind = TokenKind(1 << 8);
    pub const OBJECT_END: TokenKind = TokenKind(1 << 9);
    pub const WHITESPACE: TokenKind = TokenKind(1 << 10);
    pub const COMMENT: TokenKind = TokenKind(1 << 11);
    /// OR-combined with the partially-recognized kind when a token could not
    /// be completed.
    pub const PARSE_ERROR_INDICATOR: TokenKind = TokenKind(0x8000);

    pub fn is_error(self) -> bool {
        self & TokenKind::PARSE_ERROR_INDICATOR == TokenKind::PARSE_ERROR_INDICATOR
    }

    /// The kind bits with the error indicator stripped.
    pub fn base(self) -> TokenKind {
        TokenKind(self.0 & 0x0fff)
    }
}

impl BitOr for TokenKind {
    type Output = TokenKind;
    fn bitor(self, rhs: TokenKind) -> TokenKind {
        TokenKind(self.0 | rhs.0)
    }
}

impl BitAnd for TokenKind {
    type Output = TokenKind;
    fn bitand(self, rhs: TokenKind) -> TokenKind {
        TokenKind(self.0 & rhs.0)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_error() {
            return write!(f, "parse_error({})", self.base());
        }
        match *self {
            TokenKind::UNKNOWN => write!(f, "unknown"),
            TokenKind::ARRAY_BEGIN => write!(f, "["),
            TokenKind::ARRAY_END => write!(f, "]"),
            TokenKind::BOOLEAN => write!(f, "boolean"),
            TokenKind::NULL => write!(f, "null"),
            TokenKind::NUMBER => write!(f, "number"),
            TokenKind::SEPARATOR => write!(f, ","),
            TokenKind::STRING => write!(f, "string"),
            TokenKind::OBJECT_BEGIN => write!(f, "{{"),
            TokenKind::OBJECT_KEY_DELIMITER => write!(f, ":"),
            TokenKind::OBJECT_END => write!(f, "}}"),
            TokenKind::WHITESPACE => write!(f, "whitespace"),
            TokenKind::COMMENT => write!(f, "comment"),
            TokenKind(bits) => {
                let mut first = true;
                for shift in 0..12 {
                    if bits & (1 << shift) != 0 {
                        if !first {
                            write!(f, "|")?;
                        }
                        write!(f, "{}", TokenKind(1 << shift))?;
                        first = false;
                    }
                }
                Ok(())
            }
        }
    }
}

impl Debug for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenKind({})", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The result of attempting to match a token in a byte window.
pub enum MatchResult {
    /// A delimiter was seen; the token cannot be extended by more input.
    Complete,
    /// The window ended exactly at a valid token boundary. More input could
    /// still extend the token (e.g. `1234` followed by another digit).
    CompleteEof,
    /// A proper prefix of a valid token was seen (e.g. `tru`). At true EOF
    /// this is an error.
    IncompleteEof,
    /// No token production applies.
    Unmatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The classification of the next token in a window.
pub struct TokenMatch {
    pub result: MatchResult,
    pub kind: TokenKind,
    /// Matched (or scanned, for failures) length in bytes.
    pub length: usize,
    /// For numbers: the literal has a fraction or exponent (or is a
    /// non-finite spelling) and extracts as a decimal.
    pub decimal: bool,
    /// For strings: the body contains at least one escape sequence.
    pub escaped: bool,
}

impl TokenMatch {
    fn new(result: MatchResult, kind: TokenKind, length: usize) -> Self {
        Self {
            result,
            kind,
            length,
            decimal: false,
            escaped: false,
        }
    }

    fn complete(kind: TokenKind, length: usize) -> Self {
        Self::new(MatchResult::Complete, kind, length)
    }
}

fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_word_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Classify the next token in `window`.
///
/// The matcher is option-free: comments and the non-finite number spellings
/// (`NaN`, `Infinity`, `-Infinity`) always match and are accepted or rejected
/// by the parser according to its [options](crate::ParseOptions).
pub fn attempt_match(window: &[u8]) -> TokenMatch {
    if window.is_empty() {
        return TokenMatch::new(MatchResult::Unmatched, TokenKind::UNKNOWN, 0);
    }
    match window[0] {
        b'[' => TokenMatch::complete(TokenKind::ARRAY_BEGIN, 1),
        b']' => TokenMatch::complete(TokenKind::ARRAY_END, 1),
        b'{' => TokenMatch::complete(TokenKind::OBJECT_BEGIN, 1),
        b'}' => TokenMatch::complete(TokenKind::OBJECT_END, 1),
        b':' => TokenMatch::complete(TokenKind::OBJECT_KEY_DELIMITER, 1),
        b',' => TokenMatch::complete(TokenKind::SEPARATOR, 1),
        b'"' => match_string(window),
        b'-' => match_number(window),
        b'/' => match_comment(window),
        b'\t' | b'\n' | b'\r' | b' ' => match_whitespace(window),
        b if is_digit(b) => match_number(window),
        b if is_word_start(b) => match_word(window),
        _ => TokenMatch::new(MatchResult::Unmatched, TokenKind::UNKNOWN, 1),
    }
}

fn match_whitespace(window: &[u8]) -> TokenMatch {
    let length = window
        .iter()
        .take_while(|b| matches!(**b, b'\t' | b'\n' | b'\r' | b' '))
        .count();
    if length == window.len() {
        TokenMatch::new(MatchResult::CompleteEof, TokenKind::WHITESPACE, length)
    } else {
        TokenMatch::complete(TokenKind::WHITESPACE, length)
    }
}

const KEYWORDS: [(&[u8], TokenKind, bool); 5] = [
    (b"true", TokenKind::BOOLEAN, false),
    (b"false", TokenKind::BOOLEAN, false),
    (b"null", TokenKind::NULL, false),
    (b"NaN", TokenKind::NUMBER, true),
    (b"Infinity", TokenKind::NUMBER, true),
];

fn match_word(window: &[u8]) -> TokenMatch {
    let length = window.iter().take_while(|b| is_word_continue(**b)).count();
    let word = &window[..length];
    let at_end = length == window.len();

    for (keyword, kind, decimal) in KEYWORDS {
        if word == keyword {
            let result = if at_end {
                MatchResult::CompleteEof
            } else {
                MatchResult::Complete
            };
            let mut m = TokenMatch::new(result, kind, length);
            m.decimal = decimal;
            return m;
        }
    }
    if at_end {
        for (keyword, kind, decimal) in KEYWORDS {
            if keyword.starts_with(word) {
                let mut m = TokenMatch::new(MatchResult::IncompleteEof, kind, length);
                m.decimal = decimal;
                return m;
            }
        }
    }
    TokenMatch::new(MatchResult::Unmatched, TokenKind::UNKNOWN, length)
}

fn match_number(window: &[u8]) -> TokenMatch {
    let len = window.len();
    let mut i = 0;
    let mut decimal = false;

    let incomplete = |i| {
        let mut m = TokenMatch::new(MatchResult::IncompleteEof, TokenKind::NUMBER, i);
        m.decimal = true;
        m
    };
    let unmatched = |i| TokenMatch::new(MatchResult::Unmatched, TokenKind::NUMBER, i);

    if window[i] == b'-' {
        i += 1;
        if i == len {
            return TokenMatch::new(MatchResult::IncompleteEof, TokenKind::NUMBER, i);
        }
        // -Infinity
        if window[i] == b'I' {
            let rest = &window[i..];
            let keyword: &[u8] = b"Infinity";
            if rest.len() >= keyword.len() && &rest[..keyword.len()] == keyword {
                let mut m = TokenMatch::complete(TokenKind::NUMBER, i + keyword.len());
                if m.length == len {
                    m.result = MatchResult::CompleteEof;
                }
                m.decimal = true;
                return m;
            } else if keyword.starts_with(rest) {
                return incomplete(len);
            } else {
                return unmatched(i + 1);
            }
        }
    }

    // integer part: 0 alone, or a non-zero digit followed by any digits
    if window[i] == b'0' {
        i += 1;
        if i < len && is_digit(window[i]) {
            while i < len && is_digit(window[i]) {
                i += 1;
            }
            return unmatched(i);
        }
    } else if is_digit(window[i]) {
        while i < len && is_digit(window[i]) {
            i += 1;
        }
    } else {
        return unmatched(i + 1);
    }

    if i == len {
        return TokenMatch::new(MatchResult::CompleteEof, TokenKind::NUMBER, i);
    }

    if window[i] == b'.' {
        i += 1;
        if i == len {
            return incomplete(i);
        }
        if !is_digit(window[i]) {
            return unmatched(i);
        }
        while i < len && is_digit(window[i]) {
            i += 1;
        }
        decimal = true;
        if i == len {
            let mut m = TokenMatch::new(MatchResult::CompleteEof, TokenKind::NUMBER, i);
            m.decimal = true;
            return m;
        }
    }

    if window[i] == b'e' || window[i] == b'E' {
        i += 1;
        if i < len && (window[i] == b'+' || window[i] == b'-') {
            i += 1;
        }
        if i == len {
            return incomplete(i);
        }
        if !is_digit(window[i]) {
            return unmatched(i);
        }
        while i < len && is_digit(window[i]) {
            i += 1;
        }
        decimal = true;
        if i == len {
            let mut m = TokenMatch::new(MatchResult::CompleteEof, TokenKind::NUMBER, i);
            m.decimal = true;
            return m;
        }
    }

    let mut m = TokenMatch::complete(TokenKind::NUMBER, i);
    m.decimal = decimal;
    m
}

fn match_string(window: &[u8]) -> TokenMatch {
    let len = window.len();
    let mut i = 1;
    let mut escaped = false;

    let finish = |result, i, escaped| {
        let mut m = TokenMatch::new(result, TokenKind::STRING, i);
        m.escaped = escaped;
        m
    };

    loop {
        if i == len {
            return finish(MatchResult::IncompleteEof, i, escaped);
        }
        match window[i] {
            b'"' => return finish(MatchResult::Complete, i + 1, escaped),
            b'\\' => {
                escaped = true;
                i += 1;
                if i == len {
                    return finish(MatchResult::IncompleteEof, i, escaped);
                }
                match window[i] {
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => i += 1,
                    b'u' => {
                        i += 1;
                        for _ in 0..4 {
                            if i == len {
                                return finish(MatchResult::IncompleteEof, i, escaped);
                            }
                            if !window[i].is_ascii_hexdigit() {
                                return finish(MatchResult::Unmatched, i, escaped);
                            }
                            i += 1;
                        }
                    }
                    _ => return finish(MatchResult::Unmatched, i + 1, escaped),
                }
            }
            0x00..=0x1f => return finish(MatchResult::Unmatched, i, escaped),
            _ => i += 1,
        }
    }
}

fn match_comment(window: &[u8]) -> TokenMatch {
    let len = window.len();
    if len == 1 {
        return TokenMatch::new(MatchResult::IncompleteEof, TokenKind::COMMENT, 1);
    }
    match window[1] {
        b'/' => match window.iter().position(|b| *b == b'\n') {
            Some(eol) => TokenMatch::complete(TokenKind::COMMENT, eol),
            None => TokenMatch::new(MatchResult::CompleteEof, TokenKind::COMMENT, len),
        },
        b'*' => {
            let mut i = 2;
            while i + 1 < len {
                if window[i] == b'*' && window[i + 1] == b'/' {
                    return TokenMatch::complete(TokenKind::COMMENT, i + 2);
                }
                i += 1;
            }
            TokenMatch::new(MatchResult::IncompleteEof, TokenKind::COMMENT, len)
        }
        _ => TokenMatch::new(MatchResult::Unmatched, TokenKind::COMMENT, 1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A complete token produced by the streaming [Tokenizer].
pub struct Token<'t> {
    pub kind: TokenKind,
    pub text: &'t [u8],
    /// Byte offset of the token in the overall stream (across all fed
    /// chunks).
    pub offset: usize,
    pub(crate) decimal: bool,
    pub(crate) escaped: bool,
}

/// An incremental lexical recognizer over chunked input.
///
/// Feed bytes with [feed](Tokenizer::feed) and pull complete tokens with
/// [next_token](Tokenizer::next_token). Tail bytes representing an
/// in-progress token are retained between calls; once [finish](Tokenizer::finish)
/// declares true EOF, a retained incomplete token is promoted to an error
/// token (its kind OR-combined with
/// [PARSE_ERROR_INDICATOR](TokenKind::PARSE_ERROR_INDICATOR)).
///
/// ```
/// use json_pt::{Tokenizer, TokenKind};
///
/// let mut tokenizer = Tokenizer::new();
/// tokenizer.feed(b"[tru");
/// let first = tokenizer.next_token().unwrap();
/// assert_eq!(first.kind, TokenKind::ARRAY_BEGIN);
/// // `tru` is retained until more input arrives.
/// assert!(tokenizer.next_token().is_none());
/// tokenizer.feed(b"e]");
/// assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::BOOLEAN);
/// ```
#[derive(Debug, Default)]
pub struct Tokenizer {
    buffer: Vec<u8>,
    consumed: usize,
    base_offset: usize,
    finished: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of input. Consumed bytes from previous calls are
    /// discarded; the retained tail of an in-progress token is kept.
    pub fn feed(&mut self, bytes: &[u8]) {
        if self.consumed > 0 {
            self.buffer.drain(..self.consumed);
            self.base_offset += self.consumed;
            self.consumed = 0;
        }
        self.buffer.extend_from_slice(bytes);
    }

    /// Declare true EOF. After this, a retained incomplete token is emitted
    /// as an error token instead of waiting for more input.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// The next complete token, or `None` when the buffered input holds no
    /// complete token (feed more bytes, or call
    /// [finish](Tokenizer::finish) and pull the remainder).
    pub fn next_token(&mut self) -> Option<Token<'_>> {
        let window = &self.buffer[self.consumed..];
        if window.is_empty() {
            return None;
        }
        let m = attempt_match(window);
        let (kind, length) = match m.result {
            MatchResult::Complete => (m.kind, m.length),
            MatchResult::CompleteEof => {
                if self.finished {
                    (m.kind, m.length)
                } else {
                    return None;
                }
            }
            MatchResult::IncompleteEof => {
                if self.finished {
                    (m.kind | TokenKind::PARSE_ERROR_INDICATOR, m.length)
                } else {
                    return None;
                }
            }
            MatchResult::Unmatched => (
                m.kind | TokenKind::PARSE_ERROR_INDICATOR,
                m.length.max(1),
            ),
        };

        let start = self.consumed;
        self.consumed += length;
        Some(Token {
            kind,
            text: &self.buffer[start..start + length],
            offset: self.base_offset + start,
            decimal: m.decimal,
            escaped: m.escaped,
        })
    }
}
