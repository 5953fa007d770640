//! Recursive-descent JSON5 parser.
//!
//! The parser walks a [`CharSource`] with one token of lookahead and drives a
//! [`Builder`] with construction calls; it never materializes values itself,
//! so the same grammar pass can populate a [`crate::Document`] or any other
//! builder implementation.
//!
//! Grammar extensions over plain JSON: `//` and `/* */` comments anywhere
//! whitespace may appear, trailing commas, unquoted and single-quoted object
//! keys, a leading `+` on numbers, and leading/trailing decimal points. The
//! keyword scanner also accepts `NaN` and `Infinity`, which the lenient
//! serializer emits for non-finite numbers.
//!
//! Errors carry the line and column where the problem was detected, and a
//! missing comma between members is reported as [`ErrorKind::CommaExpected`]
//! rather than a generic syntax error.

use crate::builder::Builder;
use crate::error::{ErrorKind, Result};
use crate::source::CharSource;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Token {
    Identifier,
    String,
    Number,
    Colon,
    Comma,
    ObjectBegin,
    ObjectEnd,
    ArrayBegin,
    ArrayEnd,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Literal {
    True,
    False,
    Null,
    NaN,
    Infinity,
}

/// Drives a [`Builder`] from a [`CharSource`].
///
/// Most callers go through [`crate::parse`] or [`crate::parse_into`]; the
/// type is public for parsing from custom sources.
pub struct Parser<'a, B: Builder, S: CharSource> {
    builder: &'a mut B,
    source: S,
}

impl<'a, B: Builder, S: CharSource> Parser<'a, B, S> {
    pub fn new(builder: &'a mut B, source: S) -> Self {
        Parser { builder, source }
    }

    /// Parses one document. Input after the root value closes is ignored.
    pub fn parse(&mut self) -> Result<()> {
        self.parse_value()?;

        if !self.builder.is_valid_root() {
            return Err(self.source.make_error(ErrorKind::InvalidRoot));
        }
        Ok(())
    }

    fn fail<T>(&self, kind: ErrorKind) -> Result<T> {
        Err(self.source.make_error(kind))
    }

    fn builder_call(&self, result: std::result::Result<(), ErrorKind>) -> Result<()> {
        result.map_err(|kind| self.source.make_error(kind))
    }

    fn parse_value(&mut self) -> Result<()> {
        match self.peek_next_token()? {
            Token::Number => {
                let number = self.parse_number()?;
                let r = self.builder.set_number(number);
                self.builder_call(r)
            }
            Token::String => self.parse_string(),
            Token::Identifier => {
                let r = match self.parse_literal()? {
                    Literal::True => self.builder.set_boolean(true),
                    Literal::False => self.builder.set_boolean(false),
                    Literal::Null => self.builder.set_null(),
                    Literal::NaN => self.builder.set_number(f64::NAN),
                    Literal::Infinity => self.builder.set_number(f64::INFINITY),
                };
                self.builder_call(r)
            }
            Token::ObjectBegin => {
                let r = self.builder.push_object();
                self.builder_call(r)?;
                self.parse_object()?;
                let r = self.builder.pop();
                self.builder_call(r)
            }
            Token::ArrayBegin => {
                let r = self.builder.push_array();
                self.builder_call(r)?;
                self.parse_array()?;
                let r = self.builder.pop();
                self.builder_call(r)
            }
            _ => self.fail(ErrorKind::SyntaxError),
        }
    }

    fn parse_object(&mut self) -> Result<()> {
        self.source.next(); // '{'

        let mut expect_comma = false;
        while !self.source.eof() {
            match self.peek_next_token()? {
                Token::Identifier | Token::String => {
                    if expect_comma {
                        return self.fail(ErrorKind::CommaExpected);
                    }
                }
                Token::ObjectEnd => {
                    self.source.next(); // '}'
                    return Ok(());
                }
                Token::Comma => {
                    if !expect_comma {
                        return self.fail(ErrorKind::SyntaxError);
                    }
                    self.source.next(); // ','
                    expect_comma = false;
                    continue;
                }
                _ => {
                    return if expect_comma {
                        self.fail(ErrorKind::CommaExpected)
                    } else {
                        self.fail(ErrorKind::SyntaxError)
                    };
                }
            }

            self.parse_identifier()?;

            if self.peek_next_token()? != Token::Colon {
                return self.fail(ErrorKind::ColonExpected);
            }
            self.source.next(); // ':'

            self.builder.add_key();
            self.parse_value()?;
            self.builder.add_keyed_value();
            expect_comma = true;
        }

        self.fail(ErrorKind::UnexpectedEnd)
    }

    fn parse_array(&mut self) -> Result<()> {
        self.source.next(); // '['

        let mut expect_comma = false;
        while !self.source.eof() {
            let token = self.peek_next_token()?;

            if token == Token::ArrayEnd {
                self.source.next(); // ']'
                return Ok(());
            }

            if expect_comma {
                if token != Token::Comma {
                    return self.fail(ErrorKind::CommaExpected);
                }
                self.source.next(); // ','
                expect_comma = false;
                continue;
            }

            self.builder.begin_array_value();
            self.parse_value()?;
            self.builder.add_array_value();
            expect_comma = true;
        }

        self.fail(ErrorKind::UnexpectedEnd)
    }

    /// Skips whitespace and comments, then classifies the next significant
    /// character without consuming it.
    fn peek_next_token(&mut self) -> Result<Token> {
        #[derive(PartialEq, Eq)]
        enum Comment {
            None,
            Line,
            Block,
        }
        let mut comment = Comment::None;

        while !self.source.eof() {
            let Some(ch) = self.source.peek() else { break };

            if ch == b'\n' {
                if comment == Comment::Line {
                    comment = Comment::None;
                }
            } else if comment != Comment::None || ch <= 32 {
                if comment == Comment::Block && ch == b'*' {
                    self.source.next(); // '*'
                    if self.source.peek() == Some(b'/') {
                        comment = Comment::None;
                    }
                }
            } else if ch == b'/' {
                self.source.next(); // '/'
                match self.source.peek() {
                    Some(b'/') => comment = Comment::Line,
                    Some(b'*') => comment = Comment::Block,
                    _ => return self.fail(ErrorKind::SyntaxError),
                }
            } else {
                return match ch {
                    b'{' => Ok(Token::ObjectBegin),
                    b'}' => Ok(Token::ObjectEnd),
                    b'[' => Ok(Token::ArrayBegin),
                    b']' => Ok(Token::ArrayEnd),
                    b':' => Ok(Token::Colon),
                    b',' => Ok(Token::Comma),
                    b'"' | b'\'' => Ok(Token::String),
                    _ if ch.is_ascii_alphabetic() || ch == b'_' => Ok(Token::Identifier),
                    _ if ch.is_ascii_digit() || ch == b'.' || ch == b'+' || ch == b'-' => {
                        if ch == b'+' {
                            self.source.next(); // leading '+'
                        }
                        Ok(Token::Number)
                    }
                    _ => self.fail(ErrorKind::SyntaxError),
                };
            }

            self.source.next();
        }

        self.fail(ErrorKind::UnexpectedEnd)
    }

    /// Consumes a maximal number run and converts it.
    fn parse_number(&mut self) -> Result<f64> {
        let mut buffer = String::new();

        while !self.source.eof() {
            if let Some(ch) = self.source.next() {
                buffer.push(ch as char);
            }

            match self.source.peek() {
                Some(ch) if ch <= 32 || ch == b',' || ch == b'}' || ch == b']' => break,
                None => break,
                _ => {}
            }
        }

        match buffer.parse::<f64>() {
            Ok(number) => Ok(number),
            Err(_) => self.fail(ErrorKind::SyntaxError),
        }
    }

    /// Parses a quoted string, streaming decoded bytes into the builder.
    fn parse_string(&mut self) -> Result<()> {
        let quote = if self.source.peek() == Some(b'\'') {
            b'\''
        } else {
            b'"'
        };
        self.source.next(); // opening quote

        let r = self.builder.begin_string();
        self.builder_call(r)?;

        let mut closed = false;
        while !self.source.eof() {
            let ch = self.source.peek();

            if ch == Some(quote) {
                self.source.next(); // closing quote
                closed = true;
                break;
            }

            if ch == Some(b'\\') {
                self.source.next(); // '\\'
                match self.source.peek() {
                    // Line continuation and escapes with no output.
                    Some(b'\n') | Some(b'v') | Some(b'f') => {
                        self.source.next();
                    }
                    Some(b't') => self.append_escaped(b'\t')?,
                    Some(b'n') => self.append_escaped(b'\n')?,
                    Some(b'r') => self.append_escaped(b'\r')?,
                    Some(b'b') => self.append_escaped(b'\x08')?,
                    Some(b'\\') => self.append_escaped(b'\\')?,
                    Some(b'\'') => self.append_escaped(b'\'')?,
                    Some(b'"') => self.append_escaped(b'"')?,
                    Some(b'/') => self.append_escaped(b'/')?,
                    Some(b'0') => self.append_escaped(0)?,
                    Some(marker @ (b'x' | b'u')) => {
                        self.source.next(); // 'x' or 'u'
                        let digits = if marker == b'x' { 2 } else { 4 };
                        let codepoint = self.parse_hex_escape(digits)?;
                        let r = self.builder.append_codepoint(codepoint);
                        self.builder_call(r)?;
                    }
                    _ => return self.fail(ErrorKind::InvalidEscapeSeq),
                }
            } else if let Some(byte) = self.source.next() {
                let r = self.builder.append_char(byte);
                self.builder_call(r)?;
            }
        }

        if !closed {
            return self.fail(ErrorKind::UnexpectedEnd);
        }

        let r = self.builder.end_string();
        self.builder_call(r)
    }

    fn append_escaped(&mut self, byte: u8) -> Result<()> {
        self.source.next(); // escape letter
        let r = self.builder.append_char(byte);
        self.builder_call(r)
    }

    fn parse_hex_escape(&mut self, digits: u32) -> Result<u32> {
        let mut codepoint = 0u32;
        for _ in 0..digits {
            let digit = self
                .source
                .next()
                .and_then(|ch| (ch as char).to_digit(16))
                .ok_or_else(|| self.source.make_error(ErrorKind::InvalidEscapeSeq))?;
            codepoint = codepoint * 16 + digit;
        }
        Ok(codepoint)
    }

    /// Parses an object key: either a quoted string or a bare identifier
    /// (`[A-Za-z_]` followed by `[A-Za-z0-9_]*`).
    fn parse_identifier(&mut self) -> Result<()> {
        match self.source.peek() {
            Some(b'\'') | Some(b'"') => return self.parse_string(),
            _ => {}
        }

        let r = self.builder.begin_string();
        self.builder_call(r)?;

        while !self.source.eof() {
            if let Some(byte) = self.source.next() {
                let r = self.builder.append_char(byte);
                self.builder_call(r)?;
            }

            match self.source.peek() {
                Some(ch) if ch.is_ascii_alphanumeric() || ch == b'_' => {}
                _ => break,
            }
        }

        let r = self.builder.end_string();
        self.builder_call(r)
    }

    /// Matches the keyword literals `true`, `false`, `null`, `NaN` and
    /// `Infinity`.
    fn parse_literal(&mut self) -> Result<Literal> {
        let (literal, rest): (Literal, &[u8]) = match self.source.peek() {
            Some(b't') => (Literal::True, b"rue"),
            Some(b'f') => (Literal::False, b"alse"),
            Some(b'n') => (Literal::Null, b"ull"),
            Some(b'N') => (Literal::NaN, b"aN"),
            Some(b'I') => (Literal::Infinity, b"nfinity"),
            _ => return self.fail(ErrorKind::InvalidLiteral),
        };

        self.source.next(); // first letter
        for expected in rest {
            if self.source.next() != Some(*expected) {
                return self.fail(ErrorKind::InvalidLiteral);
            }
        }
        Ok(literal)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::parse;

    fn kind_of(text: &str) -> ErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn accepts_grammar_extensions() {
        let doc = parse(concat!(
            "// line comment\n",
            "{\n",
            "  unquoted: 1, /* block\n",
            "     comment */ 'single': +2,\n",
            "  \"double\": .5,\n",
            "  trailing: 3.,\n",
            "}\n",
        ))
        .unwrap();

        let root = doc.root();
        assert_eq!(doc.get(root, "unquoted").as_f64(), Some(1.0));
        assert_eq!(doc.get(root, "single").as_f64(), Some(2.0));
        assert_eq!(doc.get(root, "double").as_f64(), Some(0.5));
        assert_eq!(doc.get(root, "trailing").as_f64(), Some(3.0));
    }

    #[test]
    fn accepts_trailing_commas_in_arrays() {
        let doc = parse("[1, 2, 3,]").unwrap();
        assert_eq!(doc.array(doc.root()).unwrap().len(), 3);
    }

    #[test]
    fn keyword_literals() {
        let doc = parse("[true, false, null, NaN, +Infinity, -Infinity]").unwrap();
        let v = doc.array(doc.root()).unwrap();
        assert_eq!(v.get(0).as_bool(), Some(true));
        assert_eq!(v.get(1).as_bool(), Some(false));
        assert!(v.get(2).is_null());
        assert!(v.get(3).as_f64().unwrap().is_nan());
        assert_eq!(v.get(4).as_f64(), Some(f64::INFINITY));
        assert_eq!(v.get(5).as_f64(), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn infinities_round_trip_through_lenient_output() {
        let doc = parse("{ pos: +Infinity, neg: -Infinity, bare: Infinity }").unwrap();
        let root = doc.root();
        assert_eq!(doc.get(root, "pos").as_f64(), Some(f64::INFINITY));
        assert_eq!(doc.get(root, "neg").as_f64(), Some(f64::NEG_INFINITY));
        assert_eq!(doc.get(root, "bare").as_f64(), Some(f64::INFINITY));

        let text = crate::serialize(&doc, &crate::WriteOptions::default());
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn decodes_escapes() {
        let doc = parse(r#"{ s: "a\tb\n\x41é\'\"\/\\" }"#).unwrap();
        let s = doc.get(doc.root(), "s");
        assert_eq!(doc.get_str(s), Some("a\tb\nAé'\"/\\"));
    }

    #[test]
    fn zero_escape_and_swallowed_escapes() {
        let doc = parse("{ s: 'a\\0b\\vc\\fd' }").unwrap();
        let s = doc.get(doc.root(), "s");
        assert_eq!(doc.str_bytes(s), Some(&b"a\0bcd"[..]));
    }

    #[test]
    fn error_kinds() {
        assert_eq!(kind_of("42"), ErrorKind::InvalidRoot);
        assert_eq!(kind_of("'hi' "), ErrorKind::InvalidRoot);
        assert_eq!(kind_of("{ x: 1 y: 2 }"), ErrorKind::CommaExpected);
        assert_eq!(kind_of("[1 2]"), ErrorKind::CommaExpected);
        assert_eq!(kind_of("{ x 1 }"), ErrorKind::ColonExpected);
        assert_eq!(kind_of("{ x: tru }"), ErrorKind::InvalidLiteral);
        assert_eq!(kind_of("{ x: 'a\\qb' }"), ErrorKind::InvalidEscapeSeq);
        assert_eq!(kind_of("{ x: '\\u12G4' }"), ErrorKind::InvalidEscapeSeq);
        assert_eq!(kind_of("{ x: 1"), ErrorKind::UnexpectedEnd);
        assert_eq!(kind_of("{ x: 'open"), ErrorKind::UnexpectedEnd);
        assert_eq!(kind_of("[,1]"), ErrorKind::SyntaxError);
        assert_eq!(kind_of("{ x: 12..5 }"), ErrorKind::SyntaxError);
        assert_eq!(kind_of("{ x: @ }"), ErrorKind::SyntaxError);
    }

    #[test]
    fn errors_carry_positions() {
        let err = parse("{\n  x: 1\n  y: 2\n}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CommaExpected);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn trailing_input_is_ignored() {
        let doc = parse("{ x: 1 } this is not parsed").unwrap();
        assert_eq!(doc.get(doc.root(), "x").as_f64(), Some(1.0));
    }

    #[test]
    fn comments_anywhere_whitespace_is_allowed() {
        let doc = parse("{ /*a*/ x /*b*/ : /*c*/ 1 /*d*/ , // e\n }").unwrap();
        assert_eq!(doc.get(doc.root(), "x").as_f64(), Some(1.0));
    }

    #[test]
    fn unterminated_block_comment_is_unexpected_end() {
        assert_eq!(kind_of("{ /* never closed"), ErrorKind::UnexpectedEnd);
    }
}
