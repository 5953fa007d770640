//! # serde_json5
//!
//! A JSON5 document engine with an arena-backed value model and
//! Serde-compatible typed records.
//!
//! [JSON5](https://json5.org) is a superset of JSON meant for humans:
//! comments, trailing commas, unquoted and single-quoted keys, and a few
//! relaxed number forms. This crate parses that grammar into a compact
//! [`Document`] (all strings in one byte arena, all collection contents in
//! one flattened slot arena), serializes documents back to configurable
//! JSON5 or strict JSON text, and converts typed records in both directions
//! through Serde.
//!
//! ## Reading and writing documents
//!
//! ```rust
//! use serde_json5::{parse, serialize, WriteOptions};
//!
//! let doc = parse(r#"{
//!   // who to greet
//!   name: 'world',
//!   exclamations: 3,
//! }"#).unwrap();
//!
//! assert_eq!(doc.get_str(doc.get(doc.root(), "name")), Some("world"));
//!
//! let compact = serialize(&doc, &WriteOptions::new().with_compact(true));
//! assert_eq!(compact, "{name:\"world\",exclamations:3}");
//! ```
//!
//! ## Typed records
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Camera {
//!     position: [f64; 3],
//!     fov: f64,
//! }
//!
//! let camera: Camera = serde_json5::from_str(
//!     "{ position: [0, 1.5, -4], fov: 90 }",
//! ).unwrap();
//! assert_eq!(camera.fov, 90.0);
//!
//! let text = serde_json5::to_string(&camera).unwrap();
//! assert_eq!(serde_json5::from_str::<Camera>(&text).unwrap(), camera);
//! ```
//!
//! ## Construction and serialization protocols
//!
//! Parsing and typed-record conversion share one push-style construction
//! protocol ([`Builder`]), and output mirrors it with [`Writer`]. Custom
//! implementations of either can consume the grammar or the document walk
//! without going through a [`Document`] at all.

pub mod builder;
pub mod de;
pub mod error;
pub mod options;
pub mod parser;
pub mod ser;
pub mod source;
pub mod value;
pub mod writer;

pub use builder::{Builder, DocumentBuilder};
pub use de::{from_document, from_value, ValueDeserializer};
pub use error::{Error, ErrorKind, Result};
pub use options::WriteOptions;
pub use parser::Parser;
pub use ser::{to_document, DocumentSerializer};
pub use source::{CharSource, StrSource};
pub use value::{ArrayView, Document, ObjectView, Value, ValueKind};
pub use writer::{write_value, TextWriter, Writer};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write as IoWrite};
use std::path::Path;

/// Parses JSON5 text into a [`Document`].
///
/// ## Examples
///
/// ```rust
/// let doc = serde_json5::parse("{ answer: 42 }").unwrap();
/// assert_eq!(doc.get(doc.root(), "answer").as_f64(), Some(42.0));
/// ```
pub fn parse(text: &str) -> Result<Document> {
    let mut builder = DocumentBuilder::new();
    parse_into(text, &mut builder)?;
    Ok(builder.into_document())
}

/// Parses JSON5 text, driving an arbitrary [`Builder`].
pub fn parse_into<B: Builder>(text: &str, builder: &mut B) -> Result<()> {
    Parser::new(builder, StrSource::new(text)).parse()
}

/// Reads a stream to the end and parses it.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Document> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(Error::io)?;
    parse(&text)
}

/// Parses the contents of a file.
///
/// A file that cannot be opened is [`ErrorKind::CouldNotOpen`]; read
/// failures are [`ErrorKind::Io`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let file = std::fs::File::open(path).map_err(|_| Error::from_kind(ErrorKind::CouldNotOpen))?;
    parse_reader(file)
}

/// Serializes a document to JSON5 text.
#[must_use]
pub fn serialize(doc: &Document, options: &WriteOptions) -> String {
    let mut writer = TextWriter::new(options);
    write_value(&mut writer, doc, doc.root());
    writer.complete();
    writer.finish()
}

/// Serializes a document into an [`std::io::Write`] stream.
pub fn serialize_to_writer<W: IoWrite>(
    mut out: W,
    doc: &Document,
    options: &WriteOptions,
) -> Result<()> {
    out.write_all(serialize(doc, options).as_bytes())
        .map_err(Error::io)
}

/// Serializes a document into a file, creating or truncating it.
pub fn serialize_to_file<P: AsRef<Path>>(
    path: P,
    doc: &Document,
    options: &WriteOptions,
) -> Result<()> {
    let file =
        std::fs::File::create(path).map_err(|_| Error::from_kind(ErrorKind::CouldNotOpen))?;
    serialize_to_writer(file, doc, options)
}

/// Deserializes a typed record from JSON5 text.
///
/// ## Examples
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Server {
///     host: String,
///     port: u16,
/// }
///
/// let server: Server = serde_json5::from_str(
///     "{ host: 'localhost', port: 8080, /* comments welcome */ }",
/// ).unwrap();
/// assert_eq!(server.port, 8080);
/// ```
pub fn from_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    let doc = parse(text)?;
    from_document(&doc)
}

/// Serializes a typed record to JSON5 text with default options.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    to_string_with_options(value, &WriteOptions::default())
}

/// Serializes a typed record to JSON5 text.
///
/// ## Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_json5::WriteOptions;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let options = WriteOptions::new().with_compact(true);
/// let text = serde_json5::to_string_with_options(&Point { x: 1, y: 2 }, &options).unwrap();
/// assert_eq!(text, "{x:1,y:2}");
/// ```
pub fn to_string_with_options<T: Serialize>(value: &T, options: &WriteOptions) -> Result<String> {
    let doc = to_document(value)?;
    Ok(serialize(&doc, options))
}

/// Serializes a typed record into a file.
pub fn to_file<T: Serialize, P: AsRef<Path>>(
    path: P,
    value: &T,
    options: &WriteOptions,
) -> Result<()> {
    let doc = to_document(value)?;
    serialize_to_file(path, &doc, options)
}
