//! Decoding and re-escaping of JSON string bodies, shared by the document
//! parser, the path grammar and the encoder.

use crate::error::{ParseError, ParseErrorCode};
use crate::parse_index::StringEncodingAction;
use crate::util::Code;
use std::fmt::Write;

const REPLACEMENT: char = '\u{FFFD}';

fn bad_escape(code: &Code, offset: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(
        ParseErrorCode::BadEscape,
        offset,
        code.obtain_position(offset),
        message.into(),
    )
}

fn parse_hex4(raw: &[u8]) -> Option<u16> {
    if raw.len() < 4 {
        return None;
    }
    let mut out: u16 = 0;
    for b in &raw[..4] {
        let digit = (*b as char).to_digit(16)?;
        out = out << 4 | digit as u16;
    }
    Some(out)
}

/// Decode a string body (the span between the quotes). Escape sequences are
/// resolved, surrogate pairs combined, and invalid UTF-8 either replaced with
/// U+FFFD or rejected per `action`. `base` is the byte offset of the body
/// within `code`, used for error positions.
pub(crate) fn decode_string_body(
    raw: &[u8],
    action: StringEncodingAction,
    code: &Code,
    base: usize,
) -> Result<String, ParseError> {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' {
            i = decode_escape(raw, i, action, code, base, &mut out)?;
        } else {
            let segment_end = raw[i..]
                .iter()
                .position(|b| *b == b'\\')
                .map_or(raw.len(), |at| i + at);
            decode_utf8_segment(&raw[i..segment_end], action, code, base + i, &mut out)?;
            i = segment_end;
        }
    }
    Ok(out)
}

/// Decode the escape starting at `raw[start]` (a backslash); returns the
/// index one past the consumed escape.
fn decode_escape(
    raw: &[u8],
    start: usize,
    action: StringEncodingAction,
    code: &Code,
    base: usize,
    out: &mut String,
) -> Result<usize, ParseError> {
    let escape_offset = base + start;
    let mut i = start + 1;
    let short = || bad_escape(code, escape_offset, "truncated escape sequence");
    let b = *raw.get(i).ok_or_else(short)?;
    i += 1;
    match b {
        b'"' => out.push('"'),
        b'\\' => out.push('\\'),
        b'/' => out.push('/'),
        b'b' => out.push('\u{0008}'),
        b'f' => out.push('\u{000C}'),
        b'n' => out.push('\n'),
        b'r' => out.push('\r'),
        b't' => out.push('\t'),
        b'u' => {
            let unit = parse_hex4(&raw[i..]).ok_or_else(short)?;
            i += 4;
            match unit {
                0xD800..=0xDBFF => {
                    // expect a low surrogate escape to complete the pair
                    let low = if raw[i..].starts_with(b"\\u") {
                        parse_hex4(&raw[i + 2..]).filter(|u| (0xDC00..=0xDFFF).contains(u))
                    } else {
                        None
                    };
                    match low {
                        Some(low) => {
                            i += 6;
                            let combined = 0x10000
                                + ((unit as u32 - 0xD800) << 10)
                                + (low as u32 - 0xDC00);
                            out.push(char::from_u32(combined).expect("valid supplementary plane"));
                        }
                        None => match action {
                            StringEncodingAction::ReplaceInvalid => out.push(REPLACEMENT),
                            StringEncodingAction::Fail => {
                                return Err(bad_escape(
                                    code,
                                    escape_offset,
                                    "unpaired high surrogate in \\u escape",
                                ))
                            }
                        },
                    }
                }
                0xDC00..=0xDFFF => match action {
                    StringEncodingAction::ReplaceInvalid => out.push(REPLACEMENT),
                    StringEncodingAction::Fail => {
                        return Err(bad_escape(
                            code,
                            escape_offset,
                            "unpaired low surrogate in \\u escape",
                        ))
                    }
                },
                _ => out.push(char::from_u32(unit as u32).expect("BMP code point")),
            }
        }
        other => {
            return Err(bad_escape(
                code,
                escape_offset,
                format!("unrecognized escape character {:?}", other as char),
            ))
        }
    }
    Ok(i)
}

fn decode_utf8_segment(
    mut segment: &[u8],
    action: StringEncodingAction,
    code: &Code,
    mut offset: usize,
    out: &mut String,
) -> Result<(), ParseError> {
    while !segment.is_empty() {
        match std::str::from_utf8(segment) {
            Ok(text) => {
                out.push_str(text);
                return Ok(());
            }
            Err(error) => {
                let valid = error.valid_up_to();
                out.push_str(std::str::from_utf8(&segment[..valid]).expect("validated prefix"));
                match action {
                    StringEncodingAction::ReplaceInvalid => {
                        out.push(REPLACEMENT);
                        let skip = valid + error.error_len().unwrap_or(segment.len() - valid);
                        offset += skip;
                        segment = &segment[skip..];
                    }
                    StringEncodingAction::Fail => {
                        let at = offset + valid;
                        return Err(ParseError::new(
                            ParseErrorCode::InvalidUtf8,
                            at,
                            code.obtain_position(at),
                            "string is not valid UTF-8".to_owned(),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Write `text` with JSON escaping applied. With `ascii_only`, every
/// non-ASCII character is emitted as `\uXXXX` (a surrogate pair for code
/// points above U+FFFF); otherwise valid UTF-8 passes through intact.
pub(crate) fn write_escaped<W: Write>(out: &mut W, text: &str, ascii_only: bool) -> std::fmt::Result {
    for c in text.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\u{0008}' => out.write_str("\\b")?,
            '\u{000C}' => out.write_str("\\f")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c if ascii_only && !c.is_ascii() => {
                let cp = c as u32;
                if cp >= 0x10000 {
                    let high = 0xD800 + ((cp - 0x10000) >> 10);
                    let low = 0xDC00 + ((cp - 0x10000) & 0x3FF);
                    write!(out, "\\u{:04x}\\u{:04x}", high, low)?;
                } else {
                    write!(out, "\\u{:04x}", cp)?;
                }
            }
            c => out.write_char(c)?,
        }
    }
    Ok(())
}
