//! Error types for JSON5 parsing, serialization and typed-record conversion.
//!
//! Every fallible operation in this crate returns a typed [`Error`] carrying
//! an [`ErrorKind`] plus the source line and column where the problem was
//! detected (zero when no source location applies, e.g. typed-record
//! mismatches discovered while walking an already-parsed document).
//!
//! ## Examples
//!
//! ```rust
//! use serde_json5::{parse, ErrorKind};
//!
//! let err = parse("{ x: 1 y: 2 }").unwrap_err();
//! assert_eq!(err.kind, ErrorKind::CommaExpected);
//! assert_eq!(err.line, 1);
//! ```

use std::fmt;
use thiserror::Error;

/// What went wrong.
///
/// The parser produces the lexical/grammatical kinds; the typed-record layer
/// (`from_document` and friends) produces the `*Expected` mismatch kinds,
/// `WrongArraySize` and `InvalidEnum`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Document root is not an object or array
    #[error("invalid root")]
    InvalidRoot,

    /// Unexpected end of input (end of string, stream or file)
    #[error("unexpected end")]
    UnexpectedEnd,

    /// General parsing error
    #[error("syntax error")]
    SyntaxError,

    /// Invalid literal, only `true`, `false`, `null` and `NaN` are allowed
    #[error("invalid literal")]
    InvalidLiteral,

    /// Invalid or unsupported string escape sequence
    #[error("invalid escape sequence")]
    InvalidEscapeSeq,

    /// Expected comma `,`
    #[error("comma expected")]
    CommaExpected,

    /// Expected colon `:`
    #[error("colon expected")]
    ColonExpected,

    /// Expected literal `null`
    #[error("null expected")]
    NullExpected,

    /// Expected boolean literal `true` or `false`
    #[error("boolean expected")]
    BooleanExpected,

    /// Expected a number
    #[error("number expected")]
    NumberExpected,

    /// Expected a string
    #[error("string expected")]
    StringExpected,

    /// Expected an object `{ ... }`
    #[error("object expected")]
    ObjectExpected,

    /// Expected an array `[ ... ]`
    #[error("array expected")]
    ArrayExpected,

    /// Invalid number of array elements for a fixed-size target
    #[error("wrong array size")]
    WrongArraySize,

    /// Enum value or name could not be converted
    #[error("invalid enum")]
    InvalidEnum,

    /// File or stream could not be opened
    #[error("could not open stream")]
    CouldNotOpen,

    /// I/O failure while reading or writing
    #[error("io error: {0}")]
    Io(String),

    /// Message produced by a Serde `Serialize`/`Deserialize` implementation
    #[error("{0}")]
    Custom(String),
}

/// An error with its source location.
///
/// `line` and `column` are 1-based positions into the parsed text; both are
/// zero for errors that have no source location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at {line}:{column}")]
pub struct Error {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
}

impl Error {
    /// Creates an error with a source location.
    pub fn new(kind: ErrorKind, line: usize, column: usize) -> Self {
        Error { kind, line, column }
    }

    /// Creates an error without a source location.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_json5::{Error, ErrorKind};
    ///
    /// let err = Error::from_kind(ErrorKind::WrongArraySize);
    /// assert_eq!(err.line, 0);
    /// ```
    pub fn from_kind(kind: ErrorKind) -> Self {
        Error {
            kind,
            line: 0,
            column: 0,
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::from_kind(ErrorKind::Custom(msg.to_string()))
    }

    /// Creates an I/O error from a display message.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::from_kind(ErrorKind::Io(msg.to_string()))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::from_kind(kind)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::custom(msg)
    }

    fn unknown_variant(_variant: &str, _expected: &'static [&'static str]) -> Self {
        Error::from_kind(ErrorKind::InvalidEnum)
    }

    fn invalid_length(_len: usize, _exp: &dyn serde::de::Expected) -> Self {
        Error::from_kind(ErrorKind::WrongArraySize)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
