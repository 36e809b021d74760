//! Codificação de argumentos em uma árvore JSON sem perdas.
//!
//! `serde_json::to_value` colapsa valores distintos em `null` (`NaN`,
//! `±inf`, `None` e `Some(None)`). Aqui floats não finitos são rejeitados e
//! `Some(x)` vira `{"Some": x}`, então cada valor de um mesmo tipo tem uma
//! única codificação.

use std::fmt::Display;

use serde::ser::{self, Serialize};
use serde_json::{Map, Value};

use super::canonical::KeyError;

impl ser::Error for KeyError {
    fn custom<T: Display>(msg: T) -> Self {
        KeyError::Unsupported(msg.to_string())
    }
}

/// Codifica `args` sem colapsar valores distintos.
pub(crate) fn encode<A: Serialize + ?Sized>(args: &A) -> Result<Value, KeyError> {
    args.serialize(KeyEncoder)
}

fn tagged(tag: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(tag.to_owned(), value);
    Value::Object(map)
}

fn map_key(key: Value) -> Result<String, KeyError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(KeyError::Unsupported(format!(
            "map key must be a string, number or bool, found {}",
            other
        ))),
    }
}

struct KeyEncoder;

impl ser::Serializer for KeyEncoder {
    type Ok = Value;
    type Error = KeyError;

    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = TupleVariantEncoder;
    type SerializeMap = MapEncoder;
    type SerializeStruct = MapEncoder;
    type SerializeStructVariant = StructVariantEncoder;

    fn serialize_bool(self, v: bool) -> Result<Value, KeyError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, KeyError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, KeyError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, KeyError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, KeyError> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, KeyError> {
        if let Ok(small) = i64::try_from(v) {
            Ok(Value::from(small))
        } else if let Ok(unsigned) = u64::try_from(v) {
            Ok(Value::from(unsigned))
        } else {
            Err(KeyError::Unsupported(format!("integer {} out of range", v)))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Value, KeyError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, KeyError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, KeyError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, KeyError> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, KeyError> {
        u64::try_from(v)
            .map(Value::from)
            .map_err(|_| KeyError::Unsupported(format!("integer {} out of range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, KeyError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, KeyError> {
        serde_json::Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| KeyError::Unsupported(format!("non-finite float {}", v)))
    }

    fn serialize_char(self, v: char) -> Result<Value, KeyError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, KeyError> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, KeyError> {
        Ok(Value::Array(v.iter().map(|b| Value::from(*b)).collect()))
    }

    fn serialize_none(self) -> Result<Value, KeyError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, KeyError> {
        Ok(tagged("Some", value.serialize(KeyEncoder)?))
    }

    fn serialize_unit(self) -> Result<Value, KeyError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, KeyError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, KeyError> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, KeyError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, KeyError> {
        Ok(tagged(variant, value.serialize(KeyEncoder)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder, KeyError> {
        Ok(SeqEncoder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder, KeyError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqEncoder, KeyError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantEncoder, KeyError> {
        Ok(TupleVariantEncoder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder, KeyError> {
        Ok(MapEncoder {
            map: Map::new(),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapEncoder, KeyError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantEncoder, KeyError> {
        Ok(StructVariantEncoder {
            variant,
            map: Map::new(),
        })
    }
}

struct SeqEncoder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.items.push(value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, KeyError> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, KeyError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, KeyError> {
        ser::SerializeSeq::end(self)
    }
}

struct TupleVariantEncoder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for TupleVariantEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        self.items.push(value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, KeyError> {
        Ok(tagged(self.variant, Value::Array(self.items)))
    }
}

struct MapEncoder {
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl ser::SerializeMap for MapEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), KeyError> {
        self.next_key = Some(map_key(key.serialize(KeyEncoder)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| KeyError::Unsupported("map value without a key".to_string()))?;
        self.map.insert(key, value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, KeyError> {
        Ok(Value::Object(self.map))
    }
}

impl ser::SerializeStruct for MapEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), KeyError> {
        self.map.insert(key.to_owned(), value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, KeyError> {
        Ok(Value::Object(self.map))
    }
}

struct StructVariantEncoder {
    variant: &'static str,
    map: Map<String, Value>,
}

impl ser::SerializeStructVariant for StructVariantEncoder {
    type Ok = Value;
    type Error = KeyError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), KeyError> {
        self.map.insert(key.to_owned(), value.serialize(KeyEncoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, KeyError> {
        Ok(tagged(self.variant, Value::Object(self.map)))
    }
}
