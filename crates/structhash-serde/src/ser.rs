//! `serde::Serializer` that builds a [`Value`] tree.
//!
//! Mapping from the serde data model:
//! - integers up to 64 bits become `Int` / `Uint`; 128-bit integers are
//!   `Unsupported(WideInteger)`
//! - `f32` / `f64` become `Float`; `char` and `str` become `Text`
//! - byte strings become `Bytes`
//! - `Option` becomes `Indirect`
//! - unit and unit structs become empty records
//! - newtype structs are transparent
//! - sequences become `List`, tuples `Array`, structs and tuple structs `Record`
//! - maps become `Map`, pairs in serialization order
//! - enum variants become a record whose first field is the variant index,
//!   followed by the variant's payload
//!
//! Nesting depth is counted the same way the traversal counts it. Past the
//! configured limit the serializer stops descending and leaves an absent
//! placeholder, which the traversal reports as truncated.

use std::borrow::Cow;

use serde::ser::{self, Serialize};
use structhash_core::{Field, UnsupportedKind, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer {
    depth: usize,
    max_depth: Option<usize>,
}

impl ValueSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    fn nested<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        let child = Self {
            depth: self.depth + 1,
            ..self
        };
        if let Some(limit) = self.max_depth {
            if child.depth > limit {
                return Ok(Value::none());
            }
        }
        value.serialize(child)
    }

    fn record(self, name: &'static str, capacity: usize) -> SerializeRecord {
        SerializeRecord {
            ser: self,
            name,
            fields: Vec::with_capacity(capacity),
        }
    }

    fn variant(self, variant: &'static str, index: u32, capacity: usize) -> SerializeRecord {
        let mut rec = self.record(variant, capacity + 1);
        rec.fields.push(variant_tag(index));
        rec
    }
}

fn variant_tag(index: u32) -> Field {
    Field::new("variant", Value::Uint(u64::from(index)))
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeRecord;
    type SerializeTupleVariant = SerializeRecord;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeRecord;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, _v: i128) -> Result<Value> {
        Ok(Value::Unsupported(UnsupportedKind::WideInteger))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Uint(u64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Uint(u64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Uint(u64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Uint(v))
    }

    fn serialize_u128(self, _v: u128) -> Result<Value> {
        Ok(Value::Unsupported(UnsupportedKind::WideInteger))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Text(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::none())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        Ok(Value::Indirect(Some(Box::new(self.nested(value)?))))
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Record {
            name: Cow::Borrowed("()"),
            fields: Vec::new(),
        })
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(Value::Record {
            name: Cow::Borrowed(name),
            fields: Vec::new(),
        })
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Record {
            name: Cow::Borrowed(variant),
            fields: vec![variant_tag(variant_index)],
        })
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let payload = self.nested(value)?;
        Ok(Value::Record {
            name: Cow::Borrowed(variant),
            fields: vec![variant_tag(variant_index), Field::new("0", payload)],
        })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList> {
        Ok(SerializeList {
            ser: self,
            items: Vec::with_capacity(len.unwrap_or(0)),
            fixed: false,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeList> {
        Ok(SerializeList {
            ser: self,
            items: Vec::with_capacity(len),
            fixed: true,
        })
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(self.record(name, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord> {
        Ok(self.variant(variant, variant_index, len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            ser: self,
            pairs: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(self.record(name, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeRecord> {
        Ok(self.variant(variant, variant_index, len))
    }
}

pub struct SerializeList {
    ser: ValueSerializer,
    items: Vec<Value>,
    fixed: bool,
}

impl ser::SerializeSeq for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(self.ser.nested(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(if self.fixed {
            Value::Array(self.items)
        } else {
            Value::List(self.items)
        })
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeRecord {
    ser: ValueSerializer,
    name: &'static str,
    fields: Vec<Field>,
}

impl SerializeRecord {
    fn push<T: ?Sized + Serialize>(&mut self, name: &'static str, value: &T) -> Result<()> {
        let value = self.ser.nested(value)?;
        self.fields.push(Field::new(name, value));
        Ok(())
    }

    fn finish(self) -> Value {
        Value::Record {
            name: Cow::Borrowed(self.name),
            fields: self.fields,
        }
    }
}

impl ser::SerializeTupleStruct for SerializeRecord {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push("", value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeRecord {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push("", value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeRecord {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

pub struct SerializeMap {
    ser: ValueSerializer,
    pairs: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(self.ser.nested(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Custom("map value serialized before its key".into()))?;
        let value = self.ser.nested(value)?;
        self.pairs.push((key, value));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    fn to_value<T: Serialize>(v: &T) -> Value {
        v.serialize(ValueSerializer::new()).unwrap()
    }

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: Option<u8>,
    }

    #[derive(Serialize)]
    struct Meters(f32);

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(u8),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn primitives_map_to_leaves() {
        assert_eq!(to_value(&true), Value::Bool(true));
        assert_eq!(to_value(&-3i16), Value::Int(-3));
        assert_eq!(to_value(&7usize), Value::Uint(7));
        assert_eq!(to_value(&'é'), Value::Text("é".into()));
        assert_eq!(
            to_value(&1u128),
            Value::Unsupported(UnsupportedKind::WideInteger)
        );
    }

    #[test]
    fn structs_become_records_in_declaration_order() {
        let v = to_value(&Point { x: 1, y: None });
        match v {
            Value::Record { name, fields } => {
                assert_eq!(name, "Point");
                assert_eq!(fields[0], Field::new("x", 1i32));
                assert_eq!(fields[1].name, "y");
                assert_eq!(fields[1].value, Value::none());
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn newtype_struct_is_transparent() {
        assert_eq!(to_value(&Meters(2.5)), Value::Float(2.5));
    }

    #[test]
    fn tuples_are_arrays_and_vecs_are_lists() {
        assert_eq!(to_value(&(1u8, "a")), Value::Array(vec![Value::Uint(1), "a".into()]));
        assert_eq!(to_value(&vec![1u8]), Value::List(vec![Value::Uint(1)]));
    }

    #[test]
    fn enum_variants_carry_their_index() {
        match to_value(&Shape::Empty) {
            Value::Record { fields, .. } => assert_eq!(fields, vec![variant_tag(0)]),
            other => panic!("unexpected {other:?}"),
        }
        match to_value(&Shape::Circle(4)) {
            Value::Record { fields, .. } => {
                assert_eq!(fields[0], variant_tag(1));
                assert_eq!(fields[1].value, Value::Uint(4));
            }
            other => panic!("unexpected {other:?}"),
        }
        match to_value(&Shape::Rect { w: 1, h: 2 }) {
            Value::Record { name, fields } => {
                assert_eq!(name, "Rect");
                assert_eq!(fields.len(), 3);
                assert_eq!(fields[0], variant_tag(2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn maps_keep_serialization_order() {
        let mut m = BTreeMap::new();
        m.insert("b", 2u8);
        m.insert("a", 1u8);
        assert_eq!(
            to_value(&m),
            Value::Map(vec![("a".into(), 1u8.into()), ("b".into(), 2u8.into())])
        );
    }

    #[test]
    fn depth_limit_stops_descending() {
        let nested = vec![vec![vec![1u8]]];
        let v = nested
            .serialize(ValueSerializer::with_max_depth(Some(1)))
            .unwrap();
        assert_eq!(v, Value::List(vec![Value::List(vec![Value::none()])]));
    }
}
