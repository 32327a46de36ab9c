//! Encoder: typed values → [`Value`] trees.
//!
//! [`ValueEncoder`] is a `serde::Serializer` whose output is a `Value`. Derived
//! `Serialize` impls drive it field by field; each compound type gets its own
//! container:
//!
//! - [`KeyedEncoder`]: structs, maps and struct variants → Object
//! - [`UnkeyedEncoder`]: sequences, tuples and tuple variants → Array
//!
//! # Key design decisions
//!
//! - **Owned children**: a container builds its node locally and hands it to
//!   the parent only from `end()`, so a failed encode never leaves a partial
//!   node behind.
//! - **Borrowed coding path**: each container holds a [`Path`] frame pointing
//!   at its parent's. Child frames live on the stack of the call that encodes
//!   the child.
//! - **Special types by newtype name**: [`crate::date`] and [`crate::decimal`]
//!   wrap their payload in a newtype with a reserved name, which this encoder
//!   intercepts to apply the bridge's strategies.
//! - **Enums** are externally tagged: unit variants become Strings, all other
//!   variants a single-entry Object `{variant: payload}`.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::ser::{self, Impossible, Serialize};

use crate::array::Array;
use crate::bridge::{BlobStrategy, Bridge};
use crate::date::DATE_TOKEN;
use crate::decimal::DECIMAL_TOKEN;
use crate::error::{CodingError, ErrorKind};
use crate::number::Number;
use crate::object::Object;
use crate::path::Path;
use crate::value::Value;
use crate::value_serde::FLOAT_TOKEN;

/// Encode `value` at `path`, anchoring any unlocated error there.
fn encode_at<T: Serialize + ?Sized>(
    bridge: &Bridge,
    path: &Path<'_>,
    value: &T,
) -> Result<Value, CodingError> {
    value
        .serialize(ValueEncoder::new(bridge, *path))
        .map_err(|err| err.locate(path))
}

/// Wrap an enum payload as `{variant: payload}`; plain payloads pass through.
fn wrap_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(variant) => {
            let mut object = Object::with_capacity(1);
            object.set(variant, value);
            Value::Object(object)
        }
        None => value,
    }
}

// ============================================================================
// Single value
// ============================================================================

/// Serializer producing one [`Value`] for the position at `path`.
pub struct ValueEncoder<'p> {
    bridge: &'p Bridge,
    path: Path<'p>,
}

impl<'p> ValueEncoder<'p> {
    pub(crate) fn new(bridge: &'p Bridge, path: Path<'p>) -> Self {
        Self { bridge, path }
    }

    /// The date module hands over an RFC 3339 string; re-express it per strategy.
    fn encode_date<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CodingError> {
        if self.bridge.defers_dates() {
            return value.serialize(self);
        }
        let path = self.path;
        let inner = value.serialize(ValueEncoder::new(self.bridge, path))?;
        let Value::String(text) = &inner else {
            return Err(CodingError::type_mismatch("date string", inner.kind(), &path));
        };
        let date = DateTime::parse_from_rfc3339(text)
            .map_err(|err| CodingError::malformed(format!("invalid date '{text}': {err}"), &path))?
            .with_timezone(&Utc);
        self.bridge.encode_date(&date, &path)
    }

    /// Decimals arrive as their exact string form and leave as Numbers.
    fn encode_decimal<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CodingError> {
        let path = self.path;
        let inner = value.serialize(ValueEncoder::new(self.bridge, path))?;
        let Value::String(text) = &inner else {
            return Err(CodingError::type_mismatch("decimal string", inner.kind(), &path));
        };
        let parsed: f64 = text
            .parse()
            .map_err(|_| CodingError::malformed(format!("invalid decimal '{text}'"), &path))?;
        Number::with_fraction(parsed, text.contains('.'))
            .map(Value::Number)
            .ok_or_else(|| CodingError::malformed(format!("decimal '{text}' out of range"), &path))
    }

    /// A Number written as a float keeps `has_fraction` even when whole.
    fn encode_flagged_float<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CodingError> {
        match value.serialize(ValueEncoder::new(self.bridge, self.path))? {
            Value::Number(n) => Ok(Number::with_fraction(n.as_f64(), true)
                .map_or(Value::Number(n), Value::Number)),
            other => Ok(other),
        }
    }
}

impl<'p> ser::Serializer for ValueEncoder<'p> {
    type Ok = Value;
    type Error = CodingError;

    type SerializeSeq = UnkeyedEncoder<'p>;
    type SerializeTuple = UnkeyedEncoder<'p>;
    type SerializeTupleStruct = UnkeyedEncoder<'p>;
    type SerializeTupleVariant = UnkeyedEncoder<'p>;
    type SerializeMap = KeyedEncoder<'p>;
    type SerializeStruct = KeyedEncoder<'p>;
    type SerializeStructVariant = KeyedEncoder<'p>;

    fn serialize_bool(self, v: bool) -> Result<Value, CodingError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, CodingError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, CodingError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, CodingError> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, CodingError> {
        Ok(Value::Number(Number::from_i64(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, CodingError> {
        Ok(Value::Number(Number::from_i128(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, CodingError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, CodingError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, CodingError> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, CodingError> {
        Ok(Value::Number(Number::from_u64(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, CodingError> {
        Ok(Value::Number(Number::from_u128(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, CodingError> {
        if !v.is_finite() {
            return self.bridge.encode_float(f64::from(v), &self.path);
        }
        // Widen through the shortest decimal form so 0.1f32 stays 0.1.
        let widened = v.to_string().parse().unwrap_or(f64::from(v));
        self.bridge.encode_float(widened, &self.path)
    }

    fn serialize_f64(self, v: f64) -> Result<Value, CodingError> {
        self.bridge.encode_float(v, &self.path)
    }

    fn serialize_char(self, v: char) -> Result<Value, CodingError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, CodingError> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, CodingError> {
        Ok(match self.bridge.blob() {
            BlobStrategy::Blob => Value::Blob(v.to_vec()),
            BlobStrategy::Base64 => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(v))
            }
        })
    }

    fn serialize_none(self) -> Result<Value, CodingError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, CodingError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, CodingError> {
        Ok(Value::Null)
    }

    /// A type with no data still occupies its slot, as an empty Object.
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, CodingError> {
        Ok(Value::Object(Object::new()))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, CodingError> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, CodingError> {
        match name {
            DATE_TOKEN => self.encode_date(value),
            DECIMAL_TOKEN => self.encode_decimal(value),
            FLOAT_TOKEN => self.encode_flagged_float(value),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, CodingError> {
        let payload = encode_at(self.bridge, &self.path.key(variant), value)?;
        Ok(wrap_variant(Some(variant), payload))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<UnkeyedEncoder<'p>, CodingError> {
        Ok(UnkeyedEncoder::new(self.bridge, self.path, None, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<UnkeyedEncoder<'p>, CodingError> {
        Ok(UnkeyedEncoder::new(self.bridge, self.path, None, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<UnkeyedEncoder<'p>, CodingError> {
        Ok(UnkeyedEncoder::new(self.bridge, self.path, None, Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<UnkeyedEncoder<'p>, CodingError> {
        Ok(UnkeyedEncoder::new(self.bridge, self.path, Some(variant), Some(len)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<KeyedEncoder<'p>, CodingError> {
        Ok(KeyedEncoder::new(self.bridge, self.path, None, len))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<KeyedEncoder<'p>, CodingError> {
        Ok(KeyedEncoder::new(self.bridge, self.path, None, Some(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<KeyedEncoder<'p>, CodingError> {
        Ok(KeyedEncoder::new(self.bridge, self.path, Some(variant), Some(len)))
    }
}

// ============================================================================
// Unkeyed container
// ============================================================================

/// Collects elements into an Array, in the order they are serialized.
pub struct UnkeyedEncoder<'p> {
    bridge: &'p Bridge,
    path: Path<'p>,
    variant: Option<&'static str>,
    items: Array,
}

impl<'p> UnkeyedEncoder<'p> {
    fn new(
        bridge: &'p Bridge,
        path: Path<'p>,
        variant: Option<&'static str>,
        len: Option<usize>,
    ) -> Self {
        Self {
            bridge,
            path,
            variant,
            items: Array::with_capacity(len.unwrap_or(0)),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        let index = self.items.len();
        let encoded = match self.variant {
            Some(variant) => {
                let base = self.path.key(variant);
                encode_at(self.bridge, &base.index(index), value)?
            }
            None => encode_at(self.bridge, &self.path.index(index), value)?,
        };
        self.items.append(encoded);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Array(self.items))
    }
}

impl ser::SerializeSeq for UnkeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for UnkeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for UnkeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for UnkeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

// ============================================================================
// Keyed container
// ============================================================================

/// Collects named members into an Object.
pub struct KeyedEncoder<'p> {
    bridge: &'p Bridge,
    path: Path<'p>,
    variant: Option<&'static str>,
    object: Object,
    pending_key: Option<String>,
}

impl<'p> KeyedEncoder<'p> {
    fn new(
        bridge: &'p Bridge,
        path: Path<'p>,
        variant: Option<&'static str>,
        len: Option<usize>,
    ) -> Self {
        Self {
            bridge,
            path,
            variant,
            object: Object::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        }
    }

    fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), CodingError> {
        let encoded = match self.variant {
            Some(variant) => {
                let base = self.path.key(variant);
                encode_at(self.bridge, &base.key(key), value)?
            }
            None => encode_at(self.bridge, &self.path.key(key), value)?,
        };
        self.object.set(key, encoded);
        Ok(())
    }

    fn finish(self) -> Value {
        wrap_variant(self.variant, Value::Object(self.object))
    }
}

impl ser::SerializeMap for KeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), CodingError> {
        self.pending_key = Some(key.serialize(MapKeyEncoder { path: self.path })?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodingError> {
        let key = self.pending_key.take().ok_or_else(|| {
            CodingError::at(
                ErrorKind::Custom("map value serialized before its key".to_string()),
                &self.path,
            )
        })?;
        self.insert(&key, value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for KeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodingError> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for KeyedEncoder<'_> {
    type Ok = Value;
    type Error = CodingError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), CodingError> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Value, CodingError> {
        Ok(self.finish())
    }
}

// ============================================================================
// Map keys
// ============================================================================

/// Turns a map key into an Object key. Strings pass through; integers, bools
/// and chars are stringified; anything else is a type mismatch.
struct MapKeyEncoder<'p> {
    path: Path<'p>,
}

impl MapKeyEncoder<'_> {
    fn reject(&self, found: &str) -> CodingError {
        CodingError::at(
            ErrorKind::TypeMismatch {
                expected: "string map key".to_string(),
                found: found.to_string(),
            },
            &self.path,
        )
    }
}

macro_rules! stringify_key {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(fn $method(self, v: $ty) -> Result<String, CodingError> {
            Ok(v.to_string())
        })*
    };
}

impl ser::Serializer for MapKeyEncoder<'_> {
    type Ok = String;
    type Error = CodingError;

    type SerializeSeq = Impossible<String, CodingError>;
    type SerializeTuple = Impossible<String, CodingError>;
    type SerializeTupleStruct = Impossible<String, CodingError>;
    type SerializeTupleVariant = Impossible<String, CodingError>;
    type SerializeMap = Impossible<String, CodingError>;
    type SerializeStruct = Impossible<String, CodingError>;
    type SerializeStructVariant = Impossible<String, CodingError>;

    stringify_key!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_char(char),
    );

    fn serialize_f32(self, _v: f32) -> Result<String, CodingError> {
        Err(self.reject("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String, CodingError> {
        Err(self.reject("f64"))
    }

    fn serialize_str(self, v: &str) -> Result<String, CodingError> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, CodingError> {
        Err(self.reject("bytes"))
    }

    fn serialize_none(self) -> Result<String, CodingError> {
        Err(self.reject("none"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CodingError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, CodingError> {
        Err(self.reject("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<String, CodingError> {
        Err(self.reject(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, CodingError> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, CodingError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, CodingError> {
        Err(self.reject("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, CodingError> {
        Err(self.reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, CodingError> {
        Err(self.reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, CodingError> {
        Err(self.reject("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, CodingError> {
        Err(self.reject("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, CodingError> {
        Err(self.reject("map"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, CodingError> {
        Err(self.reject("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, CodingError> {
        Err(self.reject("struct variant"))
    }
}
