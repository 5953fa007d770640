//! Configuration options for text serialization.
//!
//! [`WriteOptions`] controls the shape of serialized output: indentation and
//! line endings, the single-line compact form, strict JSON compatibility and
//! Unicode escaping.
//!
//! ## Examples
//!
//! ```rust
//! use serde_json5::{parse, serialize, WriteOptions};
//!
//! let doc = parse("{ x: 1, y: [2, 3] }").unwrap();
//!
//! let compact = WriteOptions::new().with_compact(true);
//! assert_eq!(serialize(&doc, &compact), "{x:1,y:[2,3]}");
//!
//! let strict = WriteOptions::new().with_compact(true).with_json_compatible(true);
//! assert_eq!(serialize(&doc, &strict), "{\"x\":1,\"y\":[2,3]}");
//! ```

/// Options controlling text output.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    /// One level of indentation.
    pub indentation: String,

    /// End-of-line string.
    pub eol: String,

    /// Write everything on a single line and omit extra spaces.
    pub compact: bool,

    /// Write plain JSON: quoted keys, no grammar extensions, non-finite
    /// numbers rendered as `null`.
    pub json_compatible: bool,

    /// Escape non-ASCII characters in strings as `\uXXXX`.
    pub escape_unicode: bool,
}

impl WriteOptions {
    /// Creates the default options: two-space indentation, `\n` line
    /// endings, lenient multi-line output.
    #[must_use]
    pub fn new() -> Self {
        WriteOptions {
            indentation: "  ".to_string(),
            eol: "\n".to_string(),
            compact: false,
            json_compatible: false,
            escape_unicode: false,
        }
    }

    /// Sets the indentation string for one nesting level.
    #[must_use]
    pub fn with_indentation(mut self, indentation: impl Into<String>) -> Self {
        self.indentation = indentation.into();
        self
    }

    /// Sets the end-of-line string.
    #[must_use]
    pub fn with_eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    /// Enables or disables single-line compact output.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Enables or disables strict JSON output.
    #[must_use]
    pub fn with_json_compatible(mut self, json_compatible: bool) -> Self {
        self.json_compatible = json_compatible;
        self
    }

    /// Enables or disables `\uXXXX` escaping of non-ASCII characters.
    #[must_use]
    pub fn with_escape_unicode(mut self, escape_unicode: bool) -> Self {
        self.escape_unicode = escape_unicode;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions::new()
    }
}
