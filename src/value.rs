//! The document value model.
//!
//! This module provides the three core types of the engine:
//!
//! - [`Value`]: a small tagged value. Scalars (`Null`, `Bool`, `Number`) are
//!   stored inline; strings, arrays and objects carry a stable index into the
//!   arenas of the [`Document`] that owns them.
//! - [`Document`]: the arena owner. All string bytes live in one byte buffer
//!   and all array/object contents live flattened in one slot buffer, which
//!   keeps a parsed document in two allocations regardless of shape.
//! - [`ObjectView`] / [`ArrayView`]: zero-copy iteration wrappers over a
//!   `Value` known to be a collection.
//!
//! Because payloads are indices rather than addresses, cloning or moving a
//! `Document` never requires fixing values up; a `Value` remains meaningful
//! for any clone of the document it was read from.
//!
//! ## Arena layout
//!
//! An array of N elements occupies N+1 consecutive slots: a count slot
//! holding `N`, then the elements. The `Array` payload indexes the first
//! element, and readers recover the count from the slot *before* it. An
//! object of N properties occupies 2N+1 slots the same way (count slot holds
//! `2N`, then interleaved key/value pairs). Strings are stored as a 4-byte
//! little-endian length followed by the raw bytes, with the `String` payload
//! indexing the first content byte.
//!
//! ## Examples
//!
//! ```rust
//! use serde_json5::parse;
//!
//! let doc = parse("{ name: 'Alice', tags: ['admin', 'ops'] }").unwrap();
//!
//! let name = doc.get(doc.root(), "name");
//! assert_eq!(doc.get_str(name), Some("Alice"));
//!
//! let tags = doc.get(doc.root(), "tags");
//! assert_eq!(doc.array(tags).unwrap().len(), 2);
//!
//! // Missing keys and type mismatches yield Null, never a panic.
//! assert!(doc.get(doc.root(), "missing").is_null());
//! assert!(doc.at(name, 0).is_null());
//! ```

/// Classification of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    Array,
    String,
    Object,
}

/// A single JSON5 value.
///
/// `String`, `Array` and `Object` payloads are indices into the arenas of the
/// owning [`Document`]; reading them goes through the document
/// (`Document::get_str`, `Document::object`, `Document::array`). Scalars can
/// be read directly.
///
/// Equality on `Value` itself is intentionally not provided: two collection
/// values only compare meaningfully through their documents, see
/// [`Document::value_eq`].
#[derive(Clone, Copy, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(u32),
    Array(u32),
    Object(u32),
}

impl Value {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns `true` if the value is null.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is a boolean. Use [`Value::get_bool`] for reading.
    #[inline]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Returns `true` if the value is a number.
    #[inline]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if the value is a string. Use [`Document::get_str`] for reading.
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is an array. Use [`Document::array`] to iterate.
    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if the value is an object. Use [`Document::object`] to iterate.
    #[inline]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the stored boolean, or `default` if this value is not a boolean.
    #[inline]
    pub fn get_bool(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// If the value is a number, returns it.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the stored number, or `default` if this value is not a number.
    #[inline]
    pub fn get_f64(&self, default: f64) -> f64 {
        self.as_f64().unwrap_or(default)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

/// An owned JSON5 document: a root [`Value`] plus the two arenas every
/// non-scalar value in the document references.
///
/// A fresh document has a `Null` root; it is populated through a
/// [`crate::DocumentBuilder`], usually by [`crate::parse`]. Cloning performs
/// a deep copy (two buffer copies, no per-value fix-up).
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub(crate) root: Value,
    pub(crate) strings: Vec<u8>,
    pub(crate) values: Vec<Value>,
}

impl Document {
    /// Creates an empty document with a `Null` root.
    pub fn new() -> Self {
        Document::default()
    }

    /// Returns the root value.
    pub fn root(&self) -> Value {
        self.root
    }

    /// Returns the raw bytes of a string value, or `None` if `value` is not a
    /// string of this document.
    pub fn str_bytes(&self, value: Value) -> Option<&[u8]> {
        let Value::String(offset) = value else {
            return None;
        };
        let offset = offset as usize;
        let prefix = self.strings.get(offset.checked_sub(4)?..offset)?;
        let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        self.strings.get(offset..offset + len)
    }

    /// Returns a string value as `&str`, or `None` if `value` is not a string
    /// (or holds bytes that are not valid UTF-8, which can only happen for
    /// exotic escape sequences such as unpaired surrogates).
    pub fn get_str(&self, value: Value) -> Option<&str> {
        std::str::from_utf8(self.str_bytes(value)?).ok()
    }

    /// Returns a string value, or `default` on any mismatch.
    pub fn str_or<'a>(&'a self, value: Value, default: &'a str) -> &'a str {
        self.get_str(value).unwrap_or(default)
    }

    /// Returns an [`ObjectView`] if `value` is an object.
    pub fn object(&self, value: Value) -> Option<ObjectView<'_>> {
        let Value::Object(index) = value else {
            return None;
        };
        let pairs = self.collection_slots(index)?;
        Some(ObjectView { doc: self, pairs })
    }

    /// Returns an [`ArrayView`] if `value` is an array.
    pub fn array(&self, value: Value) -> Option<ArrayView<'_>> {
        let Value::Array(index) = value else {
            return None;
        };
        let elements = self.collection_slots(index)?;
        Some(ArrayView { doc: self, elements })
    }

    /// Uses `value` as an object and returns the property under `key`.
    /// Returns `Null` if `value` is not an object or `key` is not present.
    pub fn get(&self, value: Value, key: &str) -> Value {
        match self.object(value) {
            Some(view) => view.get(key),
            None => Value::Null,
        }
    }

    /// Uses `value` as an array and returns the element at `index`.
    /// Returns `Null` if `value` is not an array or `index` is out of bounds.
    pub fn at(&self, value: Value, index: usize) -> Value {
        match self.array(value) {
            Some(view) => view.get(index),
            None => Value::Null,
        }
    }

    /// Deep structural equality between a value of this document and a value
    /// of `other` (which may be the same document).
    ///
    /// Object comparison is order-independent: both sides are compared as an
    /// unordered multiset of properties by sorting pair copies on key. This
    /// is uncached and can be expensive on large nested documents.
    pub fn value_eq(&self, value: Value, other: &Document, other_value: Value) -> bool {
        match (value, other_value) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(_), Value::String(_)) => {
                self.str_bytes(value) == other.str_bytes(other_value)
            }
            (Value::Array(_), Value::Array(_)) => {
                match (self.array(value), other.array(other_value)) {
                    (Some(a), Some(b)) => a.eq_view(&b),
                    _ => false,
                }
            }
            (Value::Object(_), Value::Object(_)) => {
                match (self.object(value), other.object(other_value)) {
                    (Some(a), Some(b)) => a.eq_view(&b),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Reads the slot span of a collection whose payload is `index`; the
    /// count lives in the slot before it.
    fn collection_slots(&self, index: u32) -> Option<&[Value]> {
        let index = index as usize;
        let count_slot = *self.values.get(index.checked_sub(1)?)?;
        let count = count_slot.as_f64()? as usize;
        self.values.get(index..index + count)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(self.root, other, other.root)
    }
}

/// Zero-copy view over an object value.
///
/// Construction is O(1); [`ObjectView::find`] and [`ObjectView::get`] do a
/// linear scan. There is no hashing by design: objects are typically small
/// and the flat pair layout favors locality over lookup speed.
#[derive(Clone, Copy)]
pub struct ObjectView<'a> {
    doc: &'a Document,
    /// Interleaved key/value slots, `2 * len()` entries.
    pairs: &'a [Value],
}

impl<'a> ObjectView<'a> {
    /// Number of properties.
    pub fn len(&self) -> usize {
        self.pairs.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates properties in document order as `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Value)> + 'a {
        let doc = self.doc;
        self.pairs
            .chunks_exact(2)
            .map(move |pair| (doc.str_or(pair[0], ""), pair[1]))
    }

    /// Finds the value stored under `key`, scanning pairs linearly.
    pub fn find(&self, key: &str) -> Option<Value> {
        if key.is_empty() {
            return None;
        }
        self.pairs
            .chunks_exact(2)
            .find(|pair| self.doc.str_bytes(pair[0]) == Some(key.as_bytes()))
            .map(|pair| pair[1])
    }

    /// Like [`ObjectView::find`], but returns `Null` when absent.
    pub fn get(&self, key: &str) -> Value {
        self.find(key).unwrap_or(Value::Null)
    }

    /// The interleaved key/value slots backing this view.
    pub(crate) fn raw_pairs(&self) -> &'a [Value] {
        self.pairs
    }

    /// Order-independent equality against another object view.
    pub(crate) fn eq_view(&self, other: &ObjectView<'_>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        if self.is_empty() {
            return true;
        }

        let mut left: Vec<(&[u8], Value)> = self
            .pairs
            .chunks_exact(2)
            .map(|pair| (self.doc.str_bytes(pair[0]).unwrap_or(b""), pair[1]))
            .collect();
        let mut right: Vec<(&[u8], Value)> = other
            .pairs
            .chunks_exact(2)
            .map(|pair| (other.doc.str_bytes(pair[0]).unwrap_or(b""), pair[1]))
            .collect();

        left.sort_by(|a, b| a.0.cmp(b.0));
        right.sort_by(|a, b| a.0.cmp(b.0));

        left.iter().zip(right.iter()).all(|(a, b)| {
            a.0 == b.0 && self.doc.value_eq(a.1, other.doc, b.1)
        })
    }
}

impl PartialEq for ObjectView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_view(other)
    }
}

/// Zero-copy view over an array value.
#[derive(Clone, Copy)]
pub struct ArrayView<'a> {
    doc: &'a Document,
    elements: &'a [Value],
}

impl<'a> ArrayView<'a> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Raw element slots.
    pub fn as_slice(&self) -> &'a [Value] {
        self.elements
    }

    /// Iterates elements in order.
    pub fn iter(&self) -> impl Iterator<Item = Value> + 'a {
        self.elements.iter().copied()
    }

    /// Bounds-checked indexing; returns `Null` out of range.
    pub fn get(&self, index: usize) -> Value {
        self.elements.get(index).copied().unwrap_or(Value::Null)
    }

    pub(crate) fn eq_view(&self, other: &ArrayView<'_>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| self.doc.value_eq(a, other.doc, b))
    }
}

impl PartialEq for ArrayView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.eq_view(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, DocumentBuilder};

    fn sample() -> Document {
        let mut b = DocumentBuilder::new();
        b.push_object().unwrap();
        let s = b.string("Hello!");
        b.put("x", s);
        b.put("y", Value::from(123.0));
        b.put("z", Value::from(true));
        b.pop().unwrap();
        b.into_document()
    }

    #[test]
    fn predicates_and_scalar_accessors() {
        let v = Value::from(2.5);
        assert!(v.is_number());
        assert!(!v.is_null());
        assert_eq!(v.as_f64(), Some(2.5));
        assert_eq!(v.get_f64(0.0), 2.5);
        assert_eq!(Value::Null.get_f64(7.0), 7.0);
        assert_eq!(Value::from(true).get_bool(false), true);
        assert_eq!(Value::Null.get_bool(true), true);
        assert_eq!(Value::Null.kind(), ValueKind::Null);
    }

    #[test]
    fn object_view_lookup() {
        let doc = sample();
        let obj = doc.object(doc.root()).unwrap();
        assert_eq!(obj.len(), 3);
        assert!(!obj.is_empty());
        assert_eq!(doc.get_str(obj.get("x")), Some("Hello!"));
        assert_eq!(obj.get("y").as_f64(), Some(123.0));
        assert!(obj.get("missing").is_null());
        assert!(obj.find("").is_none());

        let keys: Vec<&str> = obj.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["x", "y", "z"]);
    }

    #[test]
    fn indexing_mismatches_yield_null() {
        let doc = sample();
        let x = doc.get(doc.root(), "x");
        assert!(doc.get(x, "anything").is_null());
        assert!(doc.at(doc.root(), 0).is_null());
        assert!(doc.at(x, 0).is_null());
    }

    #[test]
    fn deep_equality_ignores_property_order() {
        let a = crate::parse("{ x: 1, y: 2, z: 3 }").unwrap();
        let b = crate::parse("{ z: 3, x: 1, y: 2 }").unwrap();
        let c = crate::parse("{ x: 1, y: 2, z: 4 }").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn array_equality_is_positional() {
        let a = crate::parse("[1, 2, 3]").unwrap();
        let b = crate::parse("[1, 2, 3]").unwrap();
        let c = crate::parse("[3, 2, 1]").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn clone_is_deep_and_stable() {
        let doc = sample();
        let copy = doc.clone();
        assert_eq!(doc, copy);
        // A value read from the original resolves identically in the clone.
        let x = doc.get(doc.root(), "x");
        assert_eq!(copy.get_str(x), Some("Hello!"));
    }
}
