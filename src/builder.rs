//! The construction protocol.
//!
//! [`Builder`] is the push-style protocol every producer of values drives:
//! the parser issues builder calls as it recognizes grammar, and the Serde
//! serializer issues the same calls when converting typed records. The
//! protocol keeps producers completely decoupled from the target
//! representation.
//!
//! [`DocumentBuilder`] is the concrete implementation that materializes a
//! [`Document`]: a frame stack plus a scratch buffer of finished values,
//! flushed into the value arena per the collection encoding whenever a frame
//! closes.
//!
//! ## Call sequence
//!
//! Scalars are produced with `set_*`, strings with
//! `begin_string`/`append_char`/`append_codepoint`/`end_string`. Collections
//! bracket their contents with `push_object`/`push_array` and `pop`; each
//! object property is bracketed by `add_key` (after the key string is
//! produced) and `add_keyed_value`, each array element by
//! `begin_array_value`/`add_array_value`. The bracketing calls are
//! infallible; nesting discipline is the caller's responsibility.

use crate::error::ErrorKind;
use crate::value::{Document, Value};

/// Push-style construction protocol driven by the parser and the typed-record
/// serializer.
pub trait Builder {
    fn set_null(&mut self) -> Result<(), ErrorKind>;
    fn set_boolean(&mut self, value: bool) -> Result<(), ErrorKind>;
    fn set_number(&mut self, value: f64) -> Result<(), ErrorKind>;

    /// Starts assembling a string value.
    fn begin_string(&mut self) -> Result<(), ErrorKind>;
    /// Appends one raw byte to the string under assembly.
    fn append_char(&mut self, byte: u8) -> Result<(), ErrorKind>;
    /// Appends one Unicode codepoint, encoded with the extended scheme
    /// (see [`append_utf8`]).
    fn append_codepoint(&mut self, codepoint: u32) -> Result<(), ErrorKind>;
    /// Finishes the string under assembly and makes it the current value.
    fn end_string(&mut self) -> Result<(), ErrorKind>;

    fn push_object(&mut self) -> Result<(), ErrorKind>;
    fn push_array(&mut self) -> Result<(), ErrorKind>;
    /// Closes the innermost open collection and makes it the current value.
    fn pop(&mut self) -> Result<(), ErrorKind>;

    /// Commits the current value as an object key.
    fn add_key(&mut self);
    /// Commits the current value as the property value for the last key.
    fn add_keyed_value(&mut self);
    /// Announces that an array element is about to be produced.
    fn begin_array_value(&mut self);
    /// Commits the current value as an array element.
    fn add_array_value(&mut self);

    /// Whether the produced value is acceptable as a document root.
    fn is_valid_root(&self) -> bool;
}

/// Encodes `codepoint` into `out` using the extended UTF-8 scheme: the
/// standard encoding up to U+FFFF, then continuation-byte patterns of up to
/// six bytes for anything larger. The parser's `\uHHHH` decoder and the
/// writer's Unicode escaper use the same ranges, which keeps input and
/// output symmetric even for values outside the Unicode scalar range.
pub(crate) fn append_utf8(out: &mut Vec<u8>, codepoint: u32) {
    if codepoint < 0x80 {
        out.push(codepoint as u8);
    } else if codepoint < 0x800 {
        out.push(0xC0 | (codepoint >> 6) as u8);
        out.push(0x80 | (codepoint & 0x3F) as u8);
    } else if codepoint < 0x10000 {
        out.push(0xE0 | (codepoint >> 12) as u8);
        out.push(0x80 | ((codepoint >> 6) & 0x3F) as u8);
        out.push(0x80 | (codepoint & 0x3F) as u8);
    } else if codepoint < 0x20_0000 {
        out.push(0xF0 | (codepoint >> 18) as u8);
        out.push(0x80 | ((codepoint >> 12) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 6) & 0x3F) as u8);
        out.push(0x80 | (codepoint & 0x3F) as u8);
    } else if codepoint < 0x400_0000 {
        out.push(0xF8 | (codepoint >> 24) as u8);
        out.push(0x80 | ((codepoint >> 18) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 12) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 6) & 0x3F) as u8);
        out.push(0x80 | (codepoint & 0x3F) as u8);
    } else {
        out.push(0xFC | (codepoint >> 30) as u8);
        out.push(0x80 | ((codepoint >> 24) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 18) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 12) & 0x3F) as u8);
        out.push(0x80 | ((codepoint >> 6) & 0x3F) as u8);
        out.push(0x80 | (codepoint & 0x3F) as u8);
    }
}

struct Frame {
    object: bool,
    /// Scratch length when the frame opened.
    start: usize,
}

/// [`Builder`] implementation that materializes a [`Document`].
///
/// Finished values accumulate in a scratch buffer; closing a frame writes
/// the count slot and the frame's scratch slice into the value arena in one
/// contiguous block. Because payloads are arena indices, no fix-up of
/// previously produced values is ever needed while the arenas grow.
///
/// ## Examples
///
/// ```rust
/// use serde_json5::{Builder, DocumentBuilder, Value};
///
/// let mut b = DocumentBuilder::new();
/// b.push_object().unwrap();
/// let name = b.string("engine");
/// b.put("name", name);
/// b.put("version", Value::from(5.0));
/// b.pop().unwrap();
///
/// let doc = b.into_document();
/// assert_eq!(doc.get(doc.root(), "version").as_f64(), Some(5.0));
/// ```
pub struct DocumentBuilder {
    doc: Document,
    current: Value,
    scratch: Vec<Value>,
    frames: Vec<Frame>,
    /// Arena position of the length prefix of the string under assembly.
    string_prefix: usize,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder {
            doc: Document::new(),
            current: Value::Null,
            scratch: Vec::new(),
            frames: Vec::new(),
            string_prefix: 0,
        }
    }

    /// The most recently produced value.
    pub fn current_value(&self) -> Value {
        self.current
    }

    /// Interns `text` in the string arena and returns its value.
    pub fn string(&mut self, text: &str) -> Value {
        self.open_string();
        self.doc.strings.extend_from_slice(text.as_bytes());
        self.close_string()
    }

    /// Appends one property to the open object frame, interning the key.
    pub fn put(&mut self, key: &str, value: Value) {
        let key = self.string(key);
        self.put_value(key, value);
    }

    /// Appends one property to the open object frame from already-built values.
    pub fn put_value(&mut self, key: Value, value: Value) {
        self.scratch.push(key);
        self.scratch.push(value);
    }

    /// Appends one element to the open array frame.
    pub fn push_value(&mut self, value: Value) {
        self.scratch.push(value);
    }

    /// Consumes the builder, yielding the document built so far.
    pub fn into_document(self) -> Document {
        self.doc
    }

    fn open_string(&mut self) {
        self.string_prefix = self.doc.strings.len();
        self.doc.strings.extend_from_slice(&[0, 0, 0, 0]);
    }

    fn close_string(&mut self) -> Value {
        let content = self.string_prefix + 4;
        let len = (self.doc.strings.len() - content) as u32;
        self.doc.strings[self.string_prefix..content].copy_from_slice(&len.to_le_bytes());
        self.current = Value::String(content as u32);
        self.current
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        DocumentBuilder::new()
    }
}

impl Builder for DocumentBuilder {
    fn set_null(&mut self) -> Result<(), ErrorKind> {
        self.current = Value::Null;
        Ok(())
    }

    fn set_boolean(&mut self, value: bool) -> Result<(), ErrorKind> {
        self.current = Value::Bool(value);
        Ok(())
    }

    fn set_number(&mut self, value: f64) -> Result<(), ErrorKind> {
        self.current = Value::Number(value);
        Ok(())
    }

    fn begin_string(&mut self) -> Result<(), ErrorKind> {
        self.open_string();
        Ok(())
    }

    fn append_char(&mut self, byte: u8) -> Result<(), ErrorKind> {
        self.doc.strings.push(byte);
        Ok(())
    }

    fn append_codepoint(&mut self, codepoint: u32) -> Result<(), ErrorKind> {
        append_utf8(&mut self.doc.strings, codepoint);
        Ok(())
    }

    fn end_string(&mut self) -> Result<(), ErrorKind> {
        self.close_string();
        Ok(())
    }

    fn push_object(&mut self) -> Result<(), ErrorKind> {
        self.frames.push(Frame {
            object: true,
            start: self.scratch.len(),
        });
        Ok(())
    }

    fn push_array(&mut self) -> Result<(), ErrorKind> {
        self.frames.push(Frame {
            object: false,
            start: self.scratch.len(),
        });
        Ok(())
    }

    fn pop(&mut self) -> Result<(), ErrorKind> {
        let frame = self.frames.pop().ok_or(ErrorKind::SyntaxError)?;
        let count = self.scratch.len() - frame.start;

        self.doc.values.push(Value::Number(count as f64));
        let index = self.doc.values.len() as u32;
        self.doc.values.extend(self.scratch.drain(frame.start..));

        self.current = if frame.object {
            Value::Object(index)
        } else {
            Value::Array(index)
        };

        if self.frames.is_empty() {
            self.doc.root = self.current;
        }
        Ok(())
    }

    fn add_key(&mut self) {
        self.scratch.push(self.current);
    }

    fn add_keyed_value(&mut self) {
        self.scratch.push(self.current);
    }

    fn begin_array_value(&mut self) {}

    fn add_array_value(&mut self) {
        self.scratch.push(self.current);
    }

    fn is_valid_root(&self) -> bool {
        matches!(self.current, Value::Object(_) | Value::Array(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_flat_object() {
        let mut b = DocumentBuilder::new();
        b.push_object().unwrap();

        b.begin_string().unwrap();
        for byte in b"x" {
            b.append_char(*byte).unwrap();
        }
        b.end_string().unwrap();
        b.add_key();
        b.begin_string().unwrap();
        for byte in b"Hello!" {
            b.append_char(*byte).unwrap();
        }
        b.end_string().unwrap();
        b.add_keyed_value();

        b.string("y");
        b.add_key();
        b.set_number(123.0).unwrap();
        b.add_keyed_value();

        b.string("z");
        b.add_key();
        b.set_boolean(true).unwrap();
        b.add_keyed_value();

        b.pop().unwrap();
        assert!(b.is_valid_root());

        let doc = b.into_document();
        assert_eq!(doc, crate::parse("{ x: 'Hello!', y: 123, z: true }").unwrap());
    }

    #[test]
    fn builds_nested_collections() {
        let mut b = DocumentBuilder::new();
        b.push_object().unwrap();

        b.string("items");
        b.add_key();
        b.push_array().unwrap();
        for n in [1.0, 2.0, 3.0] {
            b.begin_array_value();
            b.set_number(n).unwrap();
            b.add_array_value();
        }
        b.pop().unwrap();
        b.add_keyed_value();

        b.pop().unwrap();

        let doc = b.into_document();
        let items = doc.get(doc.root(), "items");
        let view = doc.array(items).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(2).as_f64(), Some(3.0));
    }

    #[test]
    fn strings_keep_embedded_zero_bytes() {
        let mut b = DocumentBuilder::new();
        b.push_array().unwrap();
        b.begin_string().unwrap();
        b.append_char(b'a').unwrap();
        b.append_char(0).unwrap();
        b.append_char(b'b').unwrap();
        b.end_string().unwrap();
        b.add_array_value();
        b.pop().unwrap();

        let doc = b.into_document();
        assert_eq!(doc.str_bytes(doc.at(doc.root(), 0)), Some(&b"a\0b"[..]));
    }

    #[test]
    fn scalar_is_not_a_valid_root() {
        let mut b = DocumentBuilder::new();
        b.set_number(42.0).unwrap();
        assert!(!b.is_valid_root());
    }

    #[test]
    fn pop_without_frame_fails() {
        let mut b = DocumentBuilder::new();
        assert_eq!(b.pop(), Err(ErrorKind::SyntaxError));
    }

    #[test]
    fn extended_utf8_encoding_ranges() {
        let mut out = Vec::new();
        append_utf8(&mut out, 0x41);
        append_utf8(&mut out, 0xE9);
        append_utf8(&mut out, 0x20AC);
        append_utf8(&mut out, 0x1F600);
        assert_eq!(out, "Aé€😀".as_bytes());

        // Values beyond the Unicode scalar range still encode deterministically.
        let mut wide = Vec::new();
        append_utf8(&mut wide, 0x20_0000);
        assert_eq!(wide.len(), 5);
        assert_eq!(wide[0] & 0xF8, 0xF8);
        let mut wider = Vec::new();
        append_utf8(&mut wider, 0x400_0000);
        assert_eq!(wider.len(), 6);
        assert_eq!(wider[0] & 0xFC, 0xFC);
    }
}
