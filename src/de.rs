//! Serde deserializer reading from [`Document`]s.
//!
//! The read half of the typed-record layer: a [`ValueDeserializer`] walks an
//! already-parsed document tree and feeds it to any
//! [`serde::Deserialize`] implementation. Strings are borrowed straight out
//! of the document's string arena, so deserializing is allocation-free for
//! borrowed targets.
//!
//! Type mismatches surface as the typed kinds ([`ErrorKind::NumberExpected`],
//! [`ErrorKind::ObjectExpected`] and so on), fixed-size sequence length
//! mismatches as [`ErrorKind::WrongArraySize`] and unknown enum variants as
//! [`ErrorKind::InvalidEnum`]. None of these carry a source position; they
//! are discovered while walking the document, after parsing succeeded.

use serde::de::{self, Deserialize, Deserializer, IntoDeserializer, Visitor};

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Document, Value, ValueKind};

/// Deserializes `T` from the root of a parsed document.
pub fn from_document<'de, T: Deserialize<'de>>(doc: &'de Document) -> Result<T> {
    from_value(doc, doc.root())
}

/// Deserializes `T` from any value of a parsed document.
pub fn from_value<'de, T: Deserialize<'de>>(doc: &'de Document, value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer { doc, value })
}

/// [`serde::Deserializer`] over one value of a borrowed [`Document`].
#[derive(Clone, Copy)]
pub struct ValueDeserializer<'de> {
    doc: &'de Document,
    value: Value,
}

impl<'de> ValueDeserializer<'de> {
    pub fn new(doc: &'de Document, value: Value) -> Self {
        ValueDeserializer { doc, value }
    }

    fn mismatch(&self, kind: ErrorKind) -> Error {
        Error::from_kind(kind)
    }

    fn number(&self) -> Result<f64> {
        self.value
            .as_f64()
            .ok_or_else(|| self.mismatch(ErrorKind::NumberExpected))
    }

    fn string(&self) -> Result<&'de str> {
        self.doc
            .get_str(self.value)
            .ok_or_else(|| self.mismatch(ErrorKind::StringExpected))
    }
}

macro_rules! deserialize_number {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            visitor.$visit(self.number()? as $ty)
        }
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value.kind() {
            ValueKind::Null => visitor.visit_unit(),
            ValueKind::Boolean => visitor.visit_bool(self.value.get_bool(false)),
            ValueKind::Number => visitor.visit_f64(self.value.get_f64(0.0)),
            ValueKind::String => visitor.visit_borrowed_str(self.string()?),
            ValueKind::Array => self.deserialize_seq(visitor),
            ValueKind::Object => self.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value.as_bool() {
            Some(b) => visitor.visit_bool(b),
            None => Err(self.mismatch(ErrorKind::BooleanExpected)),
        }
    }

    deserialize_number!(deserialize_i8, visit_i8, i8);
    deserialize_number!(deserialize_i16, visit_i16, i16);
    deserialize_number!(deserialize_i32, visit_i32, i32);
    deserialize_number!(deserialize_i64, visit_i64, i64);
    deserialize_number!(deserialize_u8, visit_u8, u8);
    deserialize_number!(deserialize_u16, visit_u16, u16);
    deserialize_number!(deserialize_u32, visit_u32, u32);
    deserialize_number!(deserialize_u64, visit_u64, u64);
    deserialize_number!(deserialize_f32, visit_f32, f32);
    deserialize_number!(deserialize_f64, visit_f64, f64);

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let text = self.string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => visitor.visit_char(ch),
            _ => Err(self.mismatch(ErrorKind::StringExpected)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.doc.str_bytes(self.value) {
            Some(bytes) => visitor.visit_borrowed_bytes(bytes),
            None => self.deserialize_seq(visitor),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.value.is_null() {
            visitor.visit_unit()
        } else {
            Err(self.mismatch(ErrorKind::NullExpected))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let view = self
            .doc
            .array(self.value)
            .ok_or_else(|| self.mismatch(ErrorKind::ArrayExpected))?;
        visitor.visit_seq(SeqAccess {
            doc: self.doc,
            elements: view.as_slice().iter(),
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        let view = self
            .doc
            .array(self.value)
            .ok_or_else(|| self.mismatch(ErrorKind::ArrayExpected))?;
        if view.len() != len {
            return Err(self.mismatch(ErrorKind::WrongArraySize));
        }
        visitor.visit_seq(SeqAccess {
            doc: self.doc,
            elements: view.as_slice().iter(),
        })
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let view = self
            .doc
            .object(self.value)
            .ok_or_else(|| self.mismatch(ErrorKind::ObjectExpected))?;
        visitor.visit_map(MapAccess {
            doc: self.doc,
            pairs: view.raw_pairs(),
        })
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value.kind() {
            // Unit variant: the bare variant name.
            ValueKind::String => visitor.visit_enum(EnumAccess {
                doc: self.doc,
                variant: self.string()?,
                payload: None,
            }),
            // Payload variant: an object with the name as the single key.
            ValueKind::Object => {
                let view = self
                    .doc
                    .object(self.value)
                    .ok_or_else(|| self.mismatch(ErrorKind::InvalidEnum))?;
                if view.len() != 1 {
                    return Err(self.mismatch(ErrorKind::InvalidEnum));
                }
                let (variant, payload) = view
                    .iter()
                    .next()
                    .ok_or_else(|| self.mismatch(ErrorKind::InvalidEnum))?;
                visitor.visit_enum(EnumAccess {
                    doc: self.doc,
                    variant,
                    payload: Some(payload),
                })
            }
            _ => Err(self.mismatch(ErrorKind::InvalidEnum)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct SeqAccess<'de> {
    doc: &'de Document,
    elements: std::slice::Iter<'de, Value>,
}

impl<'de> de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        match self.elements.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer {
                    doc: self.doc,
                    value: *value,
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

struct MapAccess<'de> {
    doc: &'de Document,
    /// Interleaved key/value slots remaining.
    pairs: &'de [Value],
}

impl<'de> de::MapAccess<'de> for MapAccess<'de> {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let Some(key) = self.pairs.first() else {
            return Ok(None);
        };
        seed.deserialize(ValueDeserializer {
            doc: self.doc,
            value: *key,
        })
        .map(Some)
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = self.pairs[1];
        self.pairs = &self.pairs[2..];
        seed.deserialize(ValueDeserializer {
            doc: self.doc,
            value,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.pairs.len() / 2)
    }
}

struct EnumAccess<'de> {
    doc: &'de Document,
    variant: &'de str,
    payload: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = Error;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V: de::DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let name: de::value::StrDeserializer<'de, Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((
            variant,
            VariantAccess {
                doc: self.doc,
                payload: self.payload,
            },
        ))
    }
}

struct VariantAccess<'de> {
    doc: &'de Document,
    payload: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.payload {
            None => Ok(()),
            Some(_) => Err(Error::from_kind(ErrorKind::InvalidEnum)),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        let payload = self
            .payload
            .ok_or_else(|| Error::from_kind(ErrorKind::InvalidEnum))?;
        seed.deserialize(ValueDeserializer {
            doc: self.doc,
            value: payload,
        })
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
        let payload = self
            .payload
            .ok_or_else(|| Error::from_kind(ErrorKind::InvalidEnum))?;
        ValueDeserializer {
            doc: self.doc,
            value: payload,
        }
        .deserialize_tuple(len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let payload = self
            .payload
            .ok_or_else(|| Error::from_kind(ErrorKind::InvalidEnum))?;
        ValueDeserializer {
            doc: self.doc,
            value: payload,
        }
        .deserialize_map(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Settings {
        name: String,
        threshold: f64,
        enabled: bool,
    }

    #[test]
    fn struct_from_document() {
        let doc = crate::parse("{ name: 'sensor', threshold: 0.5, enabled: true }").unwrap();
        let settings: Settings = from_document(&doc).unwrap();
        assert_eq!(
            settings,
            Settings {
                name: "sensor".to_string(),
                threshold: 0.5,
                enabled: true,
            }
        );
    }

    #[test]
    fn borrowed_strings() {
        #[derive(Deserialize)]
        struct Borrowed<'a> {
            name: &'a str,
        }

        let doc = crate::parse("{ name: 'zero-copy' }").unwrap();
        let borrowed: Borrowed = from_document(&doc).unwrap();
        assert_eq!(borrowed.name, "zero-copy");
    }

    #[test]
    fn fixed_size_arrays_check_length() {
        let doc = crate::parse("{ v: [1, 2, 3, 4] }").unwrap();

        #[derive(Deserialize, Debug)]
        struct V3 {
            #[allow(dead_code)]
            v: [f64; 3],
        }

        let err = from_document::<V3>(&doc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongArraySize);

        #[derive(Deserialize)]
        struct V4 {
            v: [f64; 4],
        }

        let ok: V4 = from_document(&doc).unwrap();
        assert_eq!(ok.v, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn type_mismatch_kinds() {
        let doc = crate::parse("{ n: 'text', s: 1, b: 2, a: {}, o: [] }").unwrap();
        let root = doc.root();

        assert_eq!(
            from_value::<f64>(&doc, doc.get(root, "n")).unwrap_err().kind,
            ErrorKind::NumberExpected
        );
        assert_eq!(
            from_value::<String>(&doc, doc.get(root, "s")).unwrap_err().kind,
            ErrorKind::StringExpected
        );
        assert_eq!(
            from_value::<bool>(&doc, doc.get(root, "b")).unwrap_err().kind,
            ErrorKind::BooleanExpected
        );
        assert_eq!(
            from_value::<Vec<i32>>(&doc, doc.get(root, "a")).unwrap_err().kind,
            ErrorKind::ArrayExpected
        );
        assert_eq!(
            from_value::<std::collections::HashMap<String, i32>>(&doc, doc.get(root, "o"))
                .unwrap_err()
                .kind,
            ErrorKind::ObjectExpected
        );
    }

    #[test]
    fn enums() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Shape {
            Point,
            Circle(f64),
            Segment(f64, f64),
            Rect { w: f64, h: f64 },
        }

        let doc = crate::parse(
            "[ 'Point', { Circle: 2 }, { Segment: [1, 5] }, { Rect: { w: 3, h: 4 } } ]",
        )
        .unwrap();
        let shapes: Vec<Shape> = from_document(&doc).unwrap();
        assert_eq!(
            shapes,
            vec![
                Shape::Point,
                Shape::Circle(2.0),
                Shape::Segment(1.0, 5.0),
                Shape::Rect { w: 3.0, h: 4.0 }
            ]
        );

        let doc = crate::parse("[ 'Triangle' ]").unwrap();
        let err = from_document::<Vec<Shape>>(&doc).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEnum);
    }

    #[test]
    fn options_from_null_and_missing() {
        #[derive(Deserialize)]
        struct Opt {
            a: Option<i32>,
            b: Option<i32>,
        }

        let doc = crate::parse("{ a: null, b: 7 }").unwrap();
        let opt: Opt = from_document(&doc).unwrap();
        assert_eq!(opt.a, None);
        assert_eq!(opt.b, Some(7));
    }
}
