//! Bridge configuration and the typed entry points.
//!
//! A [`Bridge`] holds the strategies that decide how dates, non-finite floats
//! and byte buffers are represented in a value tree. The same instance drives
//! both directions, so whatever it encodes it can decode again.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::decoder::ValueDecoder;
use crate::encoder::ValueEncoder;
use crate::error::{CodingError, Error, ErrorKind};
use crate::number::Number;
use crate::object::Object;
use crate::path::Path;
use crate::value::Value;

/// Caller-supplied date encoder. Returning `None` writes an empty Object.
pub type DateEncodeFn =
    dyn Fn(&DateTime<Utc>) -> Result<Option<Value>, CodingError> + Send + Sync;

/// Caller-supplied date decoder.
pub type DateDecodeFn = dyn Fn(&Value) -> Result<DateTime<Utc>, CodingError> + Send + Sync;

/// How `chrono::DateTime<Utc>` fields (via [`crate::date`]) are represented.
#[derive(Clone, Default)]
pub enum DateStrategy {
    /// Number of milliseconds since the Unix epoch.
    #[default]
    MillisecondsSince1970,
    /// Number of seconds since the Unix epoch, fractional part kept.
    SecondsSince1970,
    /// String rendered and parsed with a chrono strftime pattern.
    Formatted(String),
    Custom {
        encode: Arc<DateEncodeFn>,
        decode: Arc<DateDecodeFn>,
    },
    /// The date's own representation: an RFC 3339 string.
    DeferredToDate,
}

impl DateStrategy {
    pub fn custom<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&DateTime<Utc>) -> Result<Option<Value>, CodingError> + Send + Sync + 'static,
        D: Fn(&Value) -> Result<DateTime<Utc>, CodingError> + Send + Sync + 'static,
    {
        DateStrategy::Custom {
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }
}

impl fmt::Debug for DateStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateStrategy::MillisecondsSince1970 => f.write_str("MillisecondsSince1970"),
            DateStrategy::SecondsSince1970 => f.write_str("SecondsSince1970"),
            DateStrategy::Formatted(pattern) => f.debug_tuple("Formatted").field(pattern).finish(),
            DateStrategy::Custom { .. } => f.write_str("Custom"),
            DateStrategy::DeferredToDate => f.write_str("DeferredToDate"),
        }
    }
}

/// What to do with NaN and the infinities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NonFiniteFloatStrategy {
    /// Encoding fails with `InvalidFloatValue`; decoding accepts only Numbers.
    #[default]
    Reject,
    /// Use sentinel strings in both directions.
    ConvertToString {
        positive_infinity: String,
        negative_infinity: String,
        nan: String,
    },
}

impl NonFiniteFloatStrategy {
    pub fn convert_to_string(
        positive_infinity: impl Into<String>,
        negative_infinity: impl Into<String>,
        nan: impl Into<String>,
    ) -> Self {
        NonFiniteFloatStrategy::ConvertToString {
            positive_infinity: positive_infinity.into(),
            negative_infinity: negative_infinity.into(),
            nan: nan.into(),
        }
    }
}

/// How byte buffers are encoded. Decoding accepts either form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlobStrategy {
    #[default]
    Blob,
    /// Standard-alphabet base64 String.
    Base64,
}

/// Encoder/decoder between typed values and [`Value`] trees.
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use yson_core::Bridge;
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let bridge = Bridge::new();
/// let value = bridge.encode(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.as_object().unwrap().get_i64("x"), Some(1));
/// let back: Point = bridge.decode(&value).unwrap();
/// assert_eq!(back, Point { x: 1, y: 2 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    date_strategy: DateStrategy,
    non_finite_float_strategy: NonFiniteFloatStrategy,
    blob_strategy: BlobStrategy,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_strategy(mut self, strategy: DateStrategy) -> Self {
        self.date_strategy = strategy;
        self
    }

    pub fn non_finite_float_strategy(mut self, strategy: NonFiniteFloatStrategy) -> Self {
        self.non_finite_float_strategy = strategy;
        self
    }

    pub fn blob_strategy(mut self, strategy: BlobStrategy) -> Self {
        self.blob_strategy = strategy;
        self
    }

    /// Encode any serializable value into a tree.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, CodingError> {
        tracing::trace!(type_name = std::any::type_name::<T>(), "encoding");
        value
            .serialize(ValueEncoder::new(self, Path::Root))
            .map_err(|err| {
                let err = err.locate(&Path::Root);
                tracing::debug!(error = %err, "encode failed");
                err
            })
    }

    /// Decode a tree into `T`. Strings in `T` may borrow from `value`.
    pub fn decode<'de, T: Deserialize<'de>>(&self, value: &'de Value) -> Result<T, CodingError> {
        tracing::trace!(type_name = std::any::type_name::<T>(), "decoding");
        T::deserialize(ValueDecoder::new(value, Path::Root, self)).map_err(|err| {
            let err = err.locate(&Path::Root);
            tracing::debug!(error = %err, "decode failed");
            err
        })
    }

    pub(crate) fn blob(&self) -> BlobStrategy {
        self.blob_strategy
    }

    // ------------------------------------------------------------------
    // Non-finite floats
    // ------------------------------------------------------------------

    pub(crate) fn encode_float(&self, v: f64, path: &Path<'_>) -> Result<Value, CodingError> {
        if let Some(n) = Number::from_f64(v) {
            return Ok(Value::Number(n));
        }
        match &self.non_finite_float_strategy {
            NonFiniteFloatStrategy::ConvertToString {
                positive_infinity,
                negative_infinity,
                nan,
            } => {
                let sentinel = if v.is_nan() {
                    nan
                } else if v > 0.0 {
                    positive_infinity
                } else {
                    negative_infinity
                };
                Ok(Value::String(sentinel.clone()))
            }
            NonFiniteFloatStrategy::Reject => Err(CodingError::at(
                ErrorKind::InvalidFloatValue { value: v },
                path,
            )),
        }
    }

    /// Sentinel string back to its float, when a string strategy is set.
    pub(crate) fn float_from_sentinel(&self, s: &str) -> Option<f64> {
        match &self.non_finite_float_strategy {
            NonFiniteFloatStrategy::ConvertToString {
                positive_infinity,
                negative_infinity,
                nan,
            } => {
                if s == positive_infinity {
                    Some(f64::INFINITY)
                } else if s == negative_infinity {
                    Some(f64::NEG_INFINITY)
                } else if s == nan {
                    Some(f64::NAN)
                } else {
                    None
                }
            }
            NonFiniteFloatStrategy::Reject => None,
        }
    }

    // ------------------------------------------------------------------
    // Dates
    // ------------------------------------------------------------------

    pub(crate) fn defers_dates(&self) -> bool {
        matches!(self.date_strategy, DateStrategy::DeferredToDate)
    }

    /// Represent `date` per the date strategy.
    pub(crate) fn encode_date(
        &self,
        date: &DateTime<Utc>,
        path: &Path<'_>,
    ) -> Result<Value, CodingError> {
        match &self.date_strategy {
            DateStrategy::MillisecondsSince1970 => {
                let millis = date.timestamp() as f64 * 1000.0
                    + f64::from(date.timestamp_subsec_nanos()) / 1_000_000.0;
                self.encode_float(millis, path)
            }
            DateStrategy::SecondsSince1970 => {
                let secs = date.timestamp() as f64
                    + f64::from(date.timestamp_subsec_nanos()) / 1_000_000_000.0;
                self.encode_float(secs, path)
            }
            DateStrategy::Formatted(pattern) => {
                use std::fmt::Write;
                let mut out = String::new();
                write!(out, "{}", date.format(pattern)).map_err(|_| {
                    CodingError::malformed(format!("invalid date format '{pattern}'"), path)
                })?;
                Ok(Value::String(out))
            }
            DateStrategy::Custom { encode, .. } => match encode(date) {
                Ok(Some(value)) => Ok(value),
                Ok(None) => Ok(Value::Object(Object::new())),
                Err(err) => Err(err.locate(path)),
            },
            DateStrategy::DeferredToDate => Ok(Value::String(crate::date::to_rfc3339(date))),
        }
    }

    /// Read a date out of `value` per the date strategy.
    pub(crate) fn decode_date(
        &self,
        value: &Value,
        path: &Path<'_>,
    ) -> Result<DateTime<Utc>, CodingError> {
        match &self.date_strategy {
            DateStrategy::MillisecondsSince1970 => {
                let n = number_for_date(value, path)?;
                date_from_millis(n.as_f64())
                    .ok_or_else(|| CodingError::malformed("date out of range", path))
            }
            DateStrategy::SecondsSince1970 => {
                let n = number_for_date(value, path)?;
                date_from_millis(n.as_f64() * 1000.0)
                    .ok_or_else(|| CodingError::malformed("date out of range", path))
            }
            DateStrategy::Formatted(pattern) => {
                let Value::String(s) = value else {
                    return Err(CodingError::type_mismatch("date string", value.kind(), path));
                };
                parse_formatted_date(s, pattern).ok_or_else(|| {
                    CodingError::malformed(
                        format!("date string '{s}' does not match format '{pattern}'"),
                        path,
                    )
                })
            }
            DateStrategy::Custom { decode, .. } => decode(value).map_err(|err| err.locate(path)),
            DateStrategy::DeferredToDate => {
                let Value::String(s) = value else {
                    return Err(CodingError::type_mismatch("date string", value.kind(), path));
                };
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|err| CodingError::malformed(format!("invalid date '{s}': {err}"), path))
            }
        }
    }
}

fn number_for_date<'v>(value: &'v Value, path: &Path<'_>) -> Result<&'v Number, CodingError> {
    value
        .as_number()
        .ok_or_else(|| CodingError::type_mismatch("date number", value.kind(), path))
}

/// Milliseconds since the epoch, fractional part kept to the nanosecond.
pub(crate) fn date_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    let whole = millis.trunc();
    // `as` saturates, so huge inputs surface as a failed multiply.
    let nanos = (whole as i128)
        .checked_mul(1_000_000)?
        .checked_add(((millis - whole) * 1_000_000.0).round() as i128)?;
    let secs = i64::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs, subsec)
}

/// Zoned pattern first, then naive date-time as UTC, then a bare date at midnight.
fn parse_formatted_date(s: &str, pattern: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(s, pattern) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, pattern) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(s, pattern).ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

// ============================================================================
// Free functions with the default bridge
// ============================================================================

/// Encode with default strategies.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodingError> {
    Bridge::new().encode(value)
}

/// Decode with default strategies.
pub fn from_value<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T, CodingError> {
    Bridge::new().decode(value)
}

/// Encode with default strategies and write compact JSON text.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CodingError> {
    Ok(to_value(value)?.to_json())
}

/// Parse JSON text and decode it with default strategies.
pub fn from_str<T: DeserializeOwned>(text: &str) -> crate::error::Result<T> {
    let value = crate::parser::parse_value(text)?;
    Bridge::new().decode(&value).map_err(Error::from)
}
