//! Decoder: [`Value`] trees → typed values.
//!
//! [`ValueDecoder`] is a `serde::Deserializer` over a borrowed `&Value`.
//! Derived `Deserialize` impls ask it for the shape they expect, and it
//! answers from whatever node it holds, applying the coercions below:
//!
//! - `bool` ← Bool, `"true"`/`"false"`, or a Number (true only for a
//!   fractional literal that truncates to 1)
//! - integers ← Number (saturating), Bool (1/0)
//! - floats ← Number, or a sentinel String under
//!   [`NonFiniteFloatStrategy::ConvertToString`](crate::NonFiniteFloatStrategy)
//! - bytes ← Blob, or a base64 String
//! - structs ← Object, or Array positionally
//! - enums ← String (unit variant) or `{variant: payload}`
//!
//! # Key design decisions
//!
//! - **Zero-copy strings**: strings are handed to visitors with
//!   `visit_borrowed_str`, so targets like `&str` borrow from the tree.
//! - **Lazy error location**: errors built by serde's derive code
//!   (`missing_field`, `invalid_length`) know only the failing key or index.
//!   Every frame that calls a visitor anchors such errors under its own path;
//!   once anchored they pass through outer frames untouched.

use std::collections::hash_map;

use base64::Engine;
use serde::de::value::{BorrowedStrDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeSeed, Visitor};
use serde::forward_to_deserialize_any;

use crate::bridge::Bridge;
use crate::date::{to_rfc3339, DATE_TOKEN};
use crate::decimal::DECIMAL_TOKEN;
use crate::error::{CodingError, ErrorKind};
use crate::object::Object;
use crate::path::Path;
use crate::value::{Value, ValueKind};

/// Anchor unlocated errors at `path`.
fn locate_at<'a>(path: &'a Path<'a>) -> impl FnOnce(CodingError) -> CodingError + 'a {
    move |err| err.locate(path)
}

// ============================================================================
// Single value
// ============================================================================

/// Deserializer for one node at a known coding path.
pub struct ValueDecoder<'de, 'p> {
    value: &'de Value,
    path: Path<'p>,
    bridge: &'p Bridge,
}

impl<'de, 'p> ValueDecoder<'de, 'p> {
    pub(crate) fn new(value: &'de Value, path: Path<'p>, bridge: &'p Bridge) -> Self {
        Self {
            value,
            path,
            bridge,
        }
    }

    fn mismatch(&self, expected: &str) -> CodingError {
        CodingError::type_mismatch(expected, self.value.kind(), &self.path)
    }

    fn decode_bool(&self) -> Result<bool, CodingError> {
        match self.value {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            Value::Number(n) => Ok(n.has_fraction() && n.as_f64().trunc() == 1.0),
            _ => Err(self.mismatch("bool")),
        }
    }

    fn decode_float(&self) -> Result<f64, CodingError> {
        match self.value {
            Value::Number(n) => Ok(n.as_f64()),
            Value::String(s) => self
                .bridge
                .float_from_sentinel(s)
                .ok_or_else(|| self.mismatch("float")),
            _ => Err(self.mismatch("float")),
        }
    }

    fn unkeyed(&self, items: &'de [Value]) -> UnkeyedDecoder<'de, 'p> {
        UnkeyedDecoder {
            items,
            index: 0,
            path: self.path,
            bridge: self.bridge,
        }
    }

    fn keyed(&self, object: &'de Object) -> KeyedDecoder<'de, 'p> {
        KeyedDecoder {
            object,
            iter: object.iter(),
            current: None,
            path: self.path,
            bridge: self.bridge,
        }
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
            let v = match self.value {
                // `as` from f64 saturates and maps NaN to 0.
                Value::Number(n) => n.as_f64() as $ty,
                Value::Bool(b) => <$ty>::from(*b),
                _ => return Err(self.mismatch(stringify!($ty))),
            };
            let path = self.path;
            visitor.$visit(v).map_err(locate_at(&path))
        })*
    };
}

impl<'de> de::Deserializer<'de> for ValueDecoder<'de, '_> {
    type Error = CodingError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let path = self.path;
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => match n.as_exact_i64() {
                Some(i) if !n.has_fraction() && i >= 0 => visitor.visit_u64(i as u64),
                Some(i) if !n.has_fraction() => visitor.visit_i64(i),
                _ => visitor.visit_f64(n.as_f64()),
            },
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Blob(bytes) => visitor.visit_borrowed_bytes(bytes),
            Value::Array(array) => visitor.visit_seq(self.unkeyed(array.as_slice())),
            Value::Object(object) => visitor.visit_map(self.keyed(object)),
        }
        .map_err(locate_at(&path))
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let b = self.decode_bool()?;
        let path = self.path;
        visitor.visit_bool(b).map_err(locate_at(&path))
    }

    deserialize_integer!(
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    );

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let f = self.decode_float()?;
        let path = self.path;
        visitor.visit_f32(f as f32).map_err(locate_at(&path))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let f = self.decode_float()?;
        let path = self.path;
        visitor.visit_f64(f).map_err(locate_at(&path))
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let Value::String(s) = self.value else {
            return Err(self.mismatch("string"));
        };
        let path = self.path;
        visitor
            .visit_borrowed_str(s)
            .map_err(|err: CodingError| err.custom_as_malformed().locate(&path))
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let path = self.path;
        match self.value {
            Value::Blob(bytes) => visitor.visit_borrowed_bytes(bytes),
            Value::String(s) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(|err| CodingError::malformed(format!("invalid base64: {err}"), &path))?;
                visitor.visit_byte_buf(bytes)
            }
            _ => return Err(self.mismatch("bytes")),
        }
        .map_err(locate_at(&path))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let path = self.path;
        let value = self.value;
        match value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
        .map_err(locate_at(&path))
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let Value::Null = self.value else {
            return Err(self.mismatch("null"));
        };
        let path = self.path;
        visitor.visit_unit().map_err(locate_at(&path))
    }

    /// Null, or any Object: the encoded form of a type without data.
    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let (Value::Null | Value::Object(_)) = self.value else {
            return Err(self.mismatch(name));
        };
        let path = self.path;
        visitor.visit_unit().map_err(locate_at(&path))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let path = self.path;
        match name {
            DATE_TOKEN if !self.bridge.defers_dates() => {
                let date = self.bridge.decode_date(self.value, &path)?;
                visitor.visit_string(to_rfc3339(&date))
            }
            DECIMAL_TOKEN => {
                let Value::Number(n) = self.value else {
                    return Err(self.mismatch("decimal number"));
                };
                // Exponent form keeps magnitudes that plain Display would pad
                // past the decimal's scale.
                visitor.visit_string(format!("{:e}", n.as_f64()))
            }
            _ => visitor.visit_newtype_struct(self),
        }
        .map_err(locate_at(&path))
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let path = self.path;
        match self.value {
            Value::Array(array) => visitor.visit_seq(self.unkeyed(array.as_slice())),
            Value::Blob(bytes) => {
                visitor.visit_seq(SeqDeserializer::<_, CodingError>::new(bytes.iter().copied()))
            }
            _ => return Err(self.mismatch("array")),
        }
        .map_err(locate_at(&path))
    }

    /// Elements past `len` are left unread.
    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        let Value::Object(object) = self.value else {
            return Err(self.mismatch("object"));
        };
        let path = self.path;
        visitor.visit_map(self.keyed(object)).map_err(locate_at(&path))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let path = self.path;
        match self.value {
            Value::Object(object) => visitor.visit_map(self.keyed(object)),
            Value::Array(array) => visitor.visit_seq(self.unkeyed(array.as_slice())),
            _ => return Err(self.mismatch("object")),
        }
        .map_err(locate_at(&path))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let access = match self.value {
            Value::String(variant) => EnumDecoder {
                variant: variant.as_str(),
                payload: None,
                path: self.path,
                bridge: self.bridge,
            },
            Value::Object(object) if object.len() == 1 => {
                let Some((variant, payload)) = object.iter().next() else {
                    return Err(self.mismatch("enum"));
                };
                EnumDecoder {
                    variant: variant.as_str(),
                    payload: Some(payload),
                    path: self.path,
                    bridge: self.bridge,
                }
            }
            _ => return Err(self.mismatch("enum")),
        };
        let path = self.path;
        visitor.visit_enum(access).map_err(locate_at(&path))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        visitor.visit_unit()
    }
}

// ============================================================================
// Unkeyed container
// ============================================================================

/// Reads Array elements in order.
pub struct UnkeyedDecoder<'de, 'p> {
    items: &'de [Value],
    index: usize,
    path: Path<'p>,
    bridge: &'p Bridge,
}

impl UnkeyedDecoder<'_, '_> {
    /// Index of the next element to be read.
    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.items.len()
    }

    /// Total number of elements, read or not.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

impl<'de> de::SeqAccess<'de> for UnkeyedDecoder<'de, '_> {
    type Error = CodingError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, CodingError> {
        let Some(item) = self.items.get(self.index) else {
            return Ok(None);
        };
        let path = self.path.index(self.index);
        let value = seed
            .deserialize(ValueDecoder::new(item, path, self.bridge))
            .map_err(locate_at(&path))?;
        self.index += 1;
        Ok(Some(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len() - self.index)
    }
}

// ============================================================================
// Keyed container
// ============================================================================

/// Reads Object members. Member order follows the Object's iteration order.
pub struct KeyedDecoder<'de, 'p> {
    object: &'de Object,
    iter: hash_map::Iter<'de, String, Value>,
    current: Option<(&'de str, &'de Value)>,
    path: Path<'p>,
    bridge: &'p Bridge,
}

impl<'de> KeyedDecoder<'de, '_> {
    pub fn all_keys(&self) -> impl Iterator<Item = &'de str> {
        self.object.keys()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.object.has(key)
    }

    pub fn len(&self) -> usize {
        self.object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }
}

impl<'de> de::MapAccess<'de> for KeyedDecoder<'de, '_> {
    type Error = CodingError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, CodingError> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.current = Some((key.as_str(), value));
        seed.deserialize(KeyDecoder {
            key: key.as_str(),
            path: self.path,
            bridge: self.bridge,
        })
        .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, CodingError> {
        let Some((key, value)) = self.current.take() else {
            return Err(CodingError::at(
                ErrorKind::Custom("map value requested before its key".to_string()),
                &self.path,
            ));
        };
        let path = self.path.key(key);
        seed.deserialize(ValueDecoder::new(value, path, self.bridge))
            .map_err(locate_at(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Deserializer for an Object key. Integer and bool targets parse the key
/// text back, mirroring how the encoder stringifies them.
struct KeyDecoder<'de, 'p> {
    key: &'de str,
    path: Path<'p>,
    bridge: &'p Bridge,
}

impl KeyDecoder<'_, '_> {
    fn mismatch(&self, expected: &str) -> CodingError {
        CodingError::type_mismatch(expected, ValueKind::String, &self.path.key(self.key))
    }
}

macro_rules! deserialize_key_integer {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
            let v: $ty = self
                .key
                .parse()
                .map_err(|_| self.mismatch(stringify!($ty)))?;
            visitor.$visit(v)
        })*
    };
}

impl<'de> de::Deserializer<'de> for KeyDecoder<'de, '_> {
    type Error = CodingError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        visitor.visit_borrowed_str(self.key)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        match self.key {
            "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            _ => Err(self.mismatch("bool")),
        }
    }

    deserialize_key_integer!(
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_i128 => visit_i128(i128),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_u128 => visit_u128(u128),
    );

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CodingError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        visitor.visit_enum(EnumDecoder {
            variant: self.key,
            payload: None,
            path: self.path,
            bridge: self.bridge,
        })
    }

    forward_to_deserialize_any! {
        f32 f64 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Variant name plus its payload, if the variant was written as an Object.
struct EnumDecoder<'de, 'p> {
    variant: &'de str,
    payload: Option<&'de Value>,
    path: Path<'p>,
    bridge: &'p Bridge,
}

impl<'de, 'p> de::EnumAccess<'de> for EnumDecoder<'de, 'p> {
    type Error = CodingError;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self), CodingError> {
        let tag = seed.deserialize(BorrowedStrDeserializer::<CodingError>::new(self.variant))?;
        Ok((tag, self))
    }
}

impl<'de> EnumDecoder<'de, '_> {
    fn missing_payload(&self, expected: &str) -> CodingError {
        CodingError::type_mismatch(expected, ValueKind::String, &self.path)
    }
}

impl<'de> de::VariantAccess<'de> for EnumDecoder<'de, '_> {
    type Error = CodingError;

    fn unit_variant(self) -> Result<(), CodingError> {
        match self.payload {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(CodingError::type_mismatch(
                "unit variant",
                other.kind(),
                &self.path.key(self.variant),
            )),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, CodingError> {
        let Some(payload) = self.payload else {
            return Err(self.missing_payload("newtype variant"));
        };
        let path = self.path.key(self.variant);
        seed.deserialize(ValueDecoder::new(payload, path, self.bridge))
            .map_err(locate_at(&path))
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let Some(payload) = self.payload else {
            return Err(self.missing_payload("tuple variant"));
        };
        let path = self.path.key(self.variant);
        de::Deserializer::deserialize_seq(ValueDecoder::new(payload, path, self.bridge), visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CodingError> {
        let Some(payload) = self.payload else {
            return Err(self.missing_payload("struct variant"));
        };
        let path = self.path.key(self.variant);
        de::Deserializer::deserialize_struct(
            ValueDecoder::new(payload, path, self.bridge),
            "",
            fields,
            visitor,
        )
    }
}
