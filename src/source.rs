//! Character sources for the parser.
//!
//! A [`CharSource`] is a byte-level cursor with one byte of lookahead and
//! line/column tracking. The parser is generic over it so tests can substitute
//! instrumented sources; production input goes through [`StrSource`]
//! (stream and file input are read into memory first, see [`crate::parse_reader`]).

use crate::error::{Error, ErrorKind};

/// A cursor over parser input.
///
/// `next` consumes and returns the next byte, `peek` previews it; both return
/// `None` at end of input. Positions are 1-based; consuming a newline resets
/// the column.
pub trait CharSource {
    fn next(&mut self) -> Option<u8>;
    fn peek(&self) -> Option<u8>;
    fn eof(&self) -> bool;

    fn line(&self) -> usize;
    fn column(&self) -> usize;

    /// Attaches the current position to an error kind.
    fn make_error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.line(), self.column())
    }
}

/// In-memory character source over a string slice.
pub struct StrSource<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        StrSource {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next(&mut self) -> Option<u8> {
        let ch = *self.bytes.get(self.pos)?;
        self.pos += 1;

        if ch == b'\n' {
            self.column = 0;
            self.line += 1;
        }
        self.column += 1;

        Some(ch)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn line(&self) -> usize {
        self.line
    }

    fn column(&self) -> usize {
        self.column
    }
}
