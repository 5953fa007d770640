//! The serialization protocol and text writer.
//!
//! [`Writer`] mirrors the construction protocol for output: a tree-walk over
//! a [`Document`] ([`write_value`]) issues protocol calls in document order,
//! and any `Writer` implementation turns them into a concrete format.
//! [`TextWriter`] is the JSON5 text implementation, configured through
//! [`WriteOptions`].
//!
//! Formatting rules worth knowing:
//!
//! - Numbers with a zero fractional part in `i64` range render as integers;
//!   other finite numbers use the shortest representation that parses back
//!   to the same value.
//! - `NaN` renders as the bare token `NaN`, except in compact mode where it
//!   becomes `null`. Infinities render as `+Infinity`/`-Infinity` (both
//!   re-parseable) unless `json_compatible` is set, which renders every
//!   non-finite number as `null`.
//! - Lenient mode leaves object keys unquoted when they are legal
//!   identifiers. `json_compatible` always quotes.
//! - With `escape_unicode`, non-ASCII characters become `\uXXXX`, decoded
//!   with the same extended multi-byte scheme the parser accepts on input;
//!   characters above U+FFFF cannot be escaped that way and degrade to `?`.
//!   String bytes that are not valid UTF-8 (a lone surrogate written as a
//!   `\uHHHH` escape, say) are `\uXXXX`-escaped in every mode, so output
//!   text never loses them.

use crate::options::WriteOptions;
use crate::value::{Document, Value};

/// Push-style serialization protocol, the output mirror of
/// [`crate::Builder`].
pub trait Writer {
    fn write_null(&mut self);
    fn write_boolean(&mut self, boolean: bool);
    fn write_number(&mut self, number: f64);
    fn write_string(&mut self, bytes: &[u8]);

    fn begin_array(&mut self);
    fn begin_array_element(&mut self);
    fn end_array(&mut self);
    fn write_empty_array(&mut self);

    fn begin_object(&mut self);
    fn begin_object_element(&mut self);
    fn write_object_key(&mut self, bytes: &[u8]);
    fn end_object(&mut self);
    fn write_empty_object(&mut self);

    /// Called once after the root value has been written.
    fn complete(&mut self);
}

/// Walks `value` within `doc` and issues [`Writer`] calls in document order.
pub fn write_value<W: Writer>(writer: &mut W, doc: &Document, value: Value) {
    match value {
        Value::Null => writer.write_null(),
        Value::Bool(b) => writer.write_boolean(b),
        Value::Number(n) => writer.write_number(n),
        Value::String(_) => writer.write_string(doc.str_bytes(value).unwrap_or(b"")),
        Value::Array(_) => {
            let view = doc.array(value);
            match view {
                Some(view) if !view.is_empty() => {
                    writer.begin_array();
                    for element in view.iter() {
                        writer.begin_array_element();
                        write_value(writer, doc, element);
                    }
                    writer.end_array();
                }
                _ => writer.write_empty_array(),
            }
        }
        Value::Object(_) => {
            let view = doc.object(value);
            match view {
                Some(view) if !view.is_empty() => {
                    writer.begin_object();
                    for (key, element) in view.iter() {
                        writer.begin_object_element();
                        writer.write_object_key(key.as_bytes());
                        write_value(writer, doc, element);
                    }
                    writer.end_object();
                }
                _ => writer.write_empty_object(),
            }
        }
    }
}

/// JSON5 text serializer.
///
/// Tracks nesting depth and a first-element flag per scope to place commas
/// and indentation. Output accumulates as bytes and is finalized with
/// [`TextWriter::finish`].
pub struct TextWriter<'a> {
    out: Vec<u8>,
    options: &'a WriteOptions,
    first_element: bool,
    first_stack: Vec<bool>,
    /// Indentation level; -1 in compact mode, which suppresses all of it.
    depth: i32,
}

impl<'a> TextWriter<'a> {
    pub fn new(options: &'a WriteOptions) -> Self {
        TextWriter {
            out: Vec::new(),
            options,
            first_element: false,
            first_stack: Vec::new(),
            depth: if options.compact { -1 } else { 0 },
        }
    }

    /// Returns the accumulated text. String bytes that are not valid UTF-8
    /// are escaped on the way through, so the output is valid UTF-8; the
    /// lossy fallback only guards against misbehaving custom documents.
    pub fn finish(self) -> String {
        match String::from_utf8(self.out) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    fn push_str(&mut self, text: &str) {
        self.out.extend_from_slice(text.as_bytes());
    }

    fn eol(&mut self) {
        if !self.options.compact {
            self.out.extend_from_slice(self.options.eol.as_bytes());
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth.max(0) {
            self.out.extend_from_slice(self.options.indentation.as_bytes());
        }
    }

    fn push_scope(&mut self) {
        self.first_stack.push(self.first_element);
        self.first_element = true;
        if self.depth != -1 {
            self.depth += 1;
        }
    }

    fn pop_scope(&mut self) {
        self.first_element = self.first_stack.pop().unwrap_or(false);
        if self.depth != -1 {
            self.depth -= 1;
        }
    }

    fn separator_and_indent(&mut self) {
        if self.first_element {
            self.first_element = false;
        } else {
            self.out.push(b',');
        }
        self.eol();
        self.indent();
    }

    /// Writes `bytes` as a quoted, escaped string.
    fn escaped_string(&mut self, bytes: &[u8]) {
        self.out.push(b'"');

        let mut i = 0;
        while i < bytes.len() {
            let byte = bytes[i];
            match byte {
                b'\n' => self.push_str("\\n"),
                b'\r' => self.push_str("\\r"),
                b'\t' => self.push_str("\\t"),
                b'"' => self.push_str("\\\""),
                b'\\' => self.push_str("\\\\"),
                0..=0x1F => {
                    let escaped = format!("\\u{:04x}", byte);
                    self.push_str(&escaped);
                }
                0x80.. => {
                    let (codepoint, consumed) = decode_extended_utf8(&bytes[i..]);
                    let raw = &bytes[i..i + consumed];
                    // Sequences that are not valid UTF-8 (such as lone
                    // surrogates from a \uHHHH escape) are always escaped so
                    // the output stays a valid string.
                    if !self.options.escape_unicode && std::str::from_utf8(raw).is_ok() {
                        self.out.extend_from_slice(raw);
                    } else if codepoint <= u16::MAX as u32 {
                        let escaped = format!("\\u{:04x}", codepoint);
                        self.push_str(&escaped);
                    } else {
                        // \uXXXX cannot express characters above U+FFFF.
                        self.out.push(b'?');
                    }
                    i += consumed;
                    continue;
                }
                _ => self.out.push(byte),
            }
            i += 1;
        }

        self.out.push(b'"');
    }
}

/// Decodes one extended-UTF-8 sequence (up to six bytes, the inverse of the
/// builder's encoder). Returns the codepoint and the number of bytes
/// consumed; a malformed lead byte consumes one byte and decodes to its own
/// value.
fn decode_extended_utf8(bytes: &[u8]) -> (u32, usize) {
    let lead = bytes[0];
    let (len, mut codepoint) = if lead & 0xE0 == 0xC0 {
        (2, (lead & 0x1F) as u32)
    } else if lead & 0xF0 == 0xE0 {
        (3, (lead & 0x0F) as u32)
    } else if lead & 0xF8 == 0xF0 {
        (4, (lead & 0x07) as u32)
    } else if lead & 0xFC == 0xF8 {
        (5, (lead & 0x03) as u32)
    } else if lead & 0xFE == 0xFC {
        (6, (lead & 0x01) as u32)
    } else {
        return (lead as u32, 1);
    };

    let mut consumed = 1;
    for &byte in bytes.iter().take(len).skip(1) {
        if byte & 0xC0 != 0x80 {
            break;
        }
        codepoint = (codepoint << 6) | (byte & 0x3F) as u32;
        consumed += 1;
    }
    (codepoint, consumed)
}

/// Whether `key` may appear unquoted in lenient output.
fn is_identifier(key: &[u8]) -> bool {
    let Some((&first, rest)) = key.split_first() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == b'_')
        && rest.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Writer for TextWriter<'_> {
    fn write_null(&mut self) {
        self.push_str("null");
    }

    fn write_boolean(&mut self, boolean: bool) {
        self.push_str(if boolean { "true" } else { "false" });
    }

    fn write_number(&mut self, number: f64) {
        if number.is_nan() {
            // Compact output stays JS-eval friendly, otherwise keep the token.
            self.push_str(if self.options.compact { "null" } else { "NaN" });
        } else if number.is_infinite() {
            if self.options.json_compatible {
                self.push_str("null");
            } else if number > 0.0 {
                self.push_str("+Infinity");
            } else {
                self.push_str("-Infinity");
            }
        } else if number.fract() == 0.0 && number > -I64_BOUND && number < I64_BOUND {
            let text = (number as i64).to_string();
            self.push_str(&text);
        } else {
            let text = number.to_string();
            self.push_str(&text);
        }
    }

    fn write_string(&mut self, bytes: &[u8]) {
        self.escaped_string(bytes);
    }

    fn begin_array(&mut self) {
        self.push_scope();
        self.out.push(b'[');
    }

    fn begin_array_element(&mut self) {
        self.separator_and_indent();
    }

    fn end_array(&mut self) {
        self.eol();
        self.pop_scope();
        self.indent();
        self.out.push(b']');
    }

    fn write_empty_array(&mut self) {
        self.push_str("[]");
    }

    fn begin_object(&mut self) {
        self.push_scope();
        self.out.push(b'{');
    }

    fn begin_object_element(&mut self) {
        self.separator_and_indent();
    }

    fn write_object_key(&mut self, bytes: &[u8]) {
        if !self.options.json_compatible && is_identifier(bytes) {
            self.out.extend_from_slice(bytes);
        } else {
            self.escaped_string(bytes);
        }
        self.push_str(if self.options.compact { ":" } else { ": " });
    }

    fn end_object(&mut self) {
        self.eol();
        self.pop_scope();
        self.indent();
        self.out.push(b'}');
    }

    fn write_empty_object(&mut self) {
        self.push_str("{}");
    }

    fn complete(&mut self) {
        self.eol();
    }
}
