use crate::strings;
use crate::value::Value;
use std::fmt::{self, Display, Formatter, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Options controlling the textual form produced by the [Encoder].
pub struct EncodeOptions {
    /// Emit newlines and indentation. The compact form has no whitespace at
    /// all.
    pub pretty: bool,
    /// Spaces per nesting level in pretty mode.
    pub indent: usize,
    /// Escape every non-ASCII character to `\uXXXX` (surrogate pairs above
    /// U+FFFF). Off by default: valid UTF-8 passes through intact.
    pub ascii_only: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: 2,
            ascii_only: false,
        }
    }
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self, indent: usize) -> Self {
        self.pretty = true;
        self.indent = indent;
        self
    }

    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array,
    Object,
}

/// A streaming JSON text encoder over any [fmt::Write] sink.
///
/// The token-level calls ([begin_object](Encoder::begin_object),
/// [key](Encoder::key), scalar writers, …) insert separators and pretty
/// indentation as needed; [value](Encoder::value) walks a whole tree in
/// canonical (sorted-key) order.
pub struct Encoder<'w, W: Write> {
    out: &'w mut W,
    options: EncodeOptions,
    stack: Vec<(Frame, usize)>,
    /// A key was just written; the next item is its value and takes no
    /// separator.
    pending_value: bool,
}

impl<'w, W: Write> Encoder<'w, W> {
    pub fn new(out: &'w mut W) -> Self {
        Self::with_options(out, EncodeOptions::default())
    }

    pub fn with_options(out: &'w mut W, options: EncodeOptions) -> Self {
        Self {
            out,
            options,
            stack: Vec::new(),
            pending_value: false,
        }
    }

    fn newline(&mut self, depth: usize) -> fmt::Result {
        self.out.write_char('\n')?;
        for _ in 0..depth * self.options.indent {
            self.out.write_char(' ')?;
        }
        Ok(())
    }

    fn before_item(&mut self) -> fmt::Result {
        if self.pending_value {
            self.pending_value = false;
            return Ok(());
        }
        let depth = self.stack.len();
        let preceding = match self.stack.last_mut() {
            None => return Ok(()),
            Some((_, count)) => {
                let preceding = *count;
                *count += 1;
                preceding
            }
        };
        if preceding > 0 {
            self.out.write_char(',')?;
        }
        if self.options.pretty {
            self.newline(depth)?;
        }
        Ok(())
    }

    fn close(&mut self, frame: Frame, bracket: char) -> fmt::Result {
        let (popped, count) = self.stack.pop().expect("unbalanced encoder call");
        debug_assert_eq!(popped, frame);
        if self.options.pretty && count > 0 {
            self.newline(self.stack.len())?;
        }
        self.out.write_char(bracket)
    }

    pub fn begin_object(&mut self) -> fmt::Result {
        self.before_item()?;
        self.stack.push((Frame::Object, 0));
        self.out.write_char('{')
    }

    pub fn end_object(&mut self) -> fmt::Result {
        self.close(Frame::Object, '}')
    }

    pub fn key(&mut self, key: &str) -> fmt::Result {
        self.before_item()?;
        self.write_quoted(key)?;
        self.out.write_char(':')?;
        if self.options.pretty {
            self.out.write_char(' ')?;
        }
        self.pending_value = true;
        Ok(())
    }

    pub fn begin_array(&mut self) -> fmt::Result {
        self.before_item()?;
        self.stack.push((Frame::Array, 0));
        self.out.write_char('[')
    }

    pub fn end_array(&mut self) -> fmt::Result {
        self.close(Frame::Array, ']')
    }

    pub fn null(&mut self) -> fmt::Result {
        self.before_item()?;
        self.out.write_str("null")
    }

    pub fn boolean(&mut self, value: bool) -> fmt::Result {
        self.before_item()?;
        self.out.write_str(if value { "true" } else { "false" })
    }

    pub fn integer(&mut self, value: i64) -> fmt::Result {
        self.before_item()?;
        write!(self.out, "{}", value)
    }

    /// Emit a decimal with enough digits to round-trip. The rendering keeps a
    /// decimal point (or exponent) so the text reads back as a decimal;
    /// non-finite values have no JSON spelling and emit `null`.
    pub fn decimal(&mut self, value: f64) -> fmt::Result {
        self.before_item()?;
        if !value.is_finite() {
            return self.out.write_str("null");
        }
        let rendered = value.to_string();
        self.out.write_str(&rendered)?;
        if !rendered.contains(&['.', 'e', 'E'][..]) {
            self.out.write_str(".0")?;
        }
        Ok(())
    }

    pub fn string(&mut self, value: &str) -> fmt::Result {
        self.before_item()?;
        self.write_quoted(value)
    }

    fn write_quoted(&mut self, text: &str) -> fmt::Result {
        self.out.write_char('"')?;
        strings::write_escaped(self.out, text, self.options.ascii_only)?;
        self.out.write_char('"')
    }

    /// Encode a whole value tree in canonical order.
    pub fn value(&mut self, value: &Value) -> fmt::Result {
        match value {
            Value::Null => self.null(),
            Value::Boolean(b) => self.boolean(*b),
            Value::Integer(n) => self.integer(*n),
            Value::Decimal(d) => self.decimal(*d),
            Value::String(s) => self.string(s),
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.value(item)?;
                }
                self.end_array()
            }
            Value::Object(members) => {
                self.begin_object()?;
                for (key, member) in members {
                    self.key(key)?;
                    self.value(member)?;
                }
                self.end_object()
            }
        }
    }
}

/// Encode `value` into `out` with the given options.
pub fn encode<W: Write>(value: &Value, out: &mut W, options: &EncodeOptions) -> fmt::Result {
    Encoder::with_options(out, options.clone()).value(value)
}

/// The encoded text of `value` with the given options.
pub fn to_string_with_options(value: &Value, options: &EncodeOptions) -> String {
    let mut out = String::new();
    encode(value, &mut out, options).expect("writing to a String cannot fail");
    out
}

impl Display for Value {
    /// The compact encoding; deterministic by the sorted object key order.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Encoder::new(f).value(self)
    }
}
