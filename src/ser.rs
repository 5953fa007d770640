//! Serde serializer producing [`Document`]s.
//!
//! Typed records are converted by driving the [`crate::Builder`] protocol
//! from a [`serde::Serializer`] implementation: scalars become `set_*`
//! calls, sequences and maps open builder frames, and the finished document
//! is then rendered by the text writer. This is the write half of the
//! typed-record layer; [`crate::to_string`] and [`crate::to_document`] are
//! the entry points.
//!
//! The document number model is `f64`, so all integer types are widened (or
//! narrowed) to doubles. Map keys must serialize as strings; anything else
//! is [`crate::ErrorKind::StringExpected`].
//!
//! Enums use the externally tagged layout: unit variants are their name as
//! a string, payload-carrying variants an object with the variant name as
//! the single key.

use serde::ser::{self, Serialize};

use crate::builder::{Builder, DocumentBuilder};
use crate::error::{Error, ErrorKind, Result};
use crate::value::{Document, Value};

/// Serializes `value` into a fresh [`Document`].
///
/// The record becomes the document root, so it must serialize as a map,
/// struct or sequence; a bare scalar root is [`ErrorKind::InvalidRoot`].
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    let mut serializer = DocumentSerializer::new();
    value.serialize(&mut serializer)?;
    if !serializer.builder.is_valid_root() {
        return Err(Error::from_kind(ErrorKind::InvalidRoot));
    }
    Ok(serializer.builder.into_document())
}

/// [`serde::Serializer`] that drives a [`DocumentBuilder`].
pub struct DocumentSerializer {
    builder: DocumentBuilder,
}

impl DocumentSerializer {
    pub fn new() -> Self {
        DocumentSerializer {
            builder: DocumentBuilder::new(),
        }
    }

    fn builder_call(&mut self, result: std::result::Result<(), ErrorKind>) -> Result<()> {
        result.map_err(Error::from_kind)
    }

    fn scalar(&mut self, value: Value) -> Result<Value> {
        let r = match value {
            Value::Null => self.builder.set_null(),
            Value::Bool(b) => self.builder.set_boolean(b),
            Value::Number(n) => self.builder.set_number(n),
            _ => Ok(()),
        };
        self.builder_call(r)?;
        Ok(value)
    }
}

impl Default for DocumentSerializer {
    fn default() -> Self {
        DocumentSerializer::new()
    }
}

impl<'a> ser::Serializer for &'a mut DocumentSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = VariantSeqSerializer<'a>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = MapSerializer<'a>;
    type SerializeStructVariant = VariantMapSerializer<'a>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        self.scalar(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        self.scalar(Value::Number(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        let mut buffer = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buffer))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(self.builder.string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        use ser::SerializeSeq;
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for byte in v {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }

    fn serialize_none(self) -> Result<Value> {
        self.scalar(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        self.scalar(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let r = self.builder.push_object();
        self.builder_call(r)?;
        let key = self.builder.string(variant);
        let inner = value.serialize(&mut *self)?;
        self.builder.put_value(key, inner);
        let r = self.builder.pop();
        self.builder_call(r)?;
        Ok(self.builder.current_value())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        let r = self.builder.push_array();
        self.builder_call(r)?;
        Ok(SeqSerializer { ser: self })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let r = self.builder.push_object();
        self.builder_call(r)?;
        let key = self.builder.string(variant);
        let r = self.builder.push_array();
        self.builder_call(r)?;
        Ok(VariantSeqSerializer { ser: self, key })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let r = self.builder.push_object();
        self.builder_call(r)?;
        Ok(MapSerializer {
            ser: self,
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let r = self.builder.push_object();
        self.builder_call(r)?;
        let key = self.builder.string(variant);
        let r = self.builder.push_object();
        self.builder_call(r)?;
        Ok(VariantMapSerializer { ser: self, key })
    }
}

pub struct SeqSerializer<'a> {
    ser: &'a mut DocumentSerializer,
}

impl SeqSerializer<'_> {
    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let element = value.serialize(&mut *self.ser)?;
        self.ser.builder.push_value(element);
        Ok(())
    }

    fn close(&mut self) -> Result<Value> {
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        Ok(self.ser.builder.current_value())
    }
}

impl ser::SerializeSeq for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(mut self) -> Result<Value> {
        self.close()
    }
}

impl ser::SerializeTuple for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(mut self) -> Result<Value> {
        self.close()
    }
}

impl ser::SerializeTupleStruct for SeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(mut self) -> Result<Value> {
        self.close()
    }
}

/// Serializes the array payload of a tuple variant, then wraps it in the
/// single-key variant object.
pub struct VariantSeqSerializer<'a> {
    ser: &'a mut DocumentSerializer,
    key: Value,
}

impl ser::SerializeTupleVariant for VariantSeqSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let element = value.serialize(&mut *self.ser)?;
        self.ser.builder.push_value(element);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        let payload = self.ser.builder.current_value();
        self.ser.builder.put_value(self.key, payload);
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        Ok(self.ser.builder.current_value())
    }
}

pub struct MapSerializer<'a> {
    ser: &'a mut DocumentSerializer,
    pending_key: Option<Value>,
}

impl MapSerializer<'_> {
    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let key = self.ser.builder.string(key);
        let value = value.serialize(&mut *self.ser)?;
        self.ser.builder.put_value(key, value);
        Ok(())
    }

    fn close(&mut self) -> Result<Value> {
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        Ok(self.ser.builder.current_value())
    }
}

impl ser::SerializeMap for MapSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        let key = key.serialize(&mut *self.ser)?;
        if !key.is_string() {
            return Err(Error::from_kind(ErrorKind::StringExpected));
        }
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::from_kind(ErrorKind::StringExpected))?;
        let value = value.serialize(&mut *self.ser)?;
        self.ser.builder.put_value(key, value);
        Ok(())
    }

    fn end(mut self) -> Result<Value> {
        self.close()
    }
}

impl ser::SerializeStruct for MapSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.field(key, value)
    }

    fn end(mut self) -> Result<Value> {
        self.close()
    }
}

/// Serializes the object payload of a struct variant, then wraps it in the
/// single-key variant object.
pub struct VariantMapSerializer<'a> {
    ser: &'a mut DocumentSerializer,
    key: Value,
}

impl ser::SerializeStructVariant for VariantMapSerializer<'_> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let key = self.ser.builder.string(key);
        let value = value.serialize(&mut *self.ser)?;
        self.ser.builder.put_value(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        let payload = self.ser.builder.current_value();
        self.ser.builder.put_value(self.key, payload);
        let r = self.ser.builder.pop();
        self.ser.builder_call(r)?;
        Ok(self.ser.builder.current_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WriteOptions;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Settings {
        name: String,
        threshold: f64,
        enabled: bool,
        tags: Vec<String>,
    }

    #[test]
    fn struct_to_document() {
        let settings = Settings {
            name: "sensor".to_string(),
            threshold: 0.5,
            enabled: true,
            tags: vec!["a".to_string(), "b".to_string()],
        };

        let doc = to_document(&settings).unwrap();
        let root = doc.root();
        assert_eq!(doc.get_str(doc.get(root, "name")), Some("sensor"));
        assert_eq!(doc.get(root, "threshold").as_f64(), Some(0.5));
        assert_eq!(doc.get(root, "enabled").as_bool(), Some(true));
        assert_eq!(doc.array(doc.get(root, "tags")).unwrap().len(), 2);
    }

    #[test]
    fn scalar_root_is_rejected() {
        let err = to_document(&42).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRoot);
    }

    #[test]
    fn nested_collections_serialize_in_order() {
        #[derive(Serialize)]
        struct Outer {
            inner: Vec<Vec<i32>>,
        }

        let doc = to_document(&Outer {
            inner: vec![vec![1, 2], vec![3]],
        })
        .unwrap();
        let options = WriteOptions::new().with_compact(true);
        assert_eq!(crate::serialize(&doc, &options), "{inner:[[1,2],[3]]}");
    }

    #[test]
    fn enum_layouts() {
        #[derive(Serialize)]
        enum Shape {
            Point,
            Circle(f64),
            Rect { w: f64, h: f64 },
        }

        #[derive(Serialize)]
        struct Shapes {
            a: Shape,
            b: Shape,
            c: Shape,
        }

        let doc = to_document(&Shapes {
            a: Shape::Point,
            b: Shape::Circle(2.0),
            c: Shape::Rect { w: 3.0, h: 4.0 },
        })
        .unwrap();
        let options = WriteOptions::new().with_compact(true);
        assert_eq!(
            crate::serialize(&doc, &options),
            "{a:\"Point\",b:{Circle:2},c:{Rect:{w:3,h:4}}}"
        );
    }

    #[test]
    fn non_string_map_keys_are_rejected() {
        use std::collections::BTreeMap;
        let map: BTreeMap<i32, i32> = [(1, 2)].into_iter().collect();
        let err = to_document(&map).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StringExpected);
    }
}
