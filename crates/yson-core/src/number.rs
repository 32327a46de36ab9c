//! Numeric payload of [`crate::Value::Number`].

use std::fmt::{self, Write};

/// A finite `f64` plus a flag recording whether it was written as a float.
///
/// The flag never takes part in equality. The bridge consults it when a
/// number has to be read as a boolean, and the serializer uses it to decide
/// between `1` and `1.0`.
#[derive(Debug, Clone, Copy)]
pub struct Number {
    value: f64,
    has_fraction: bool,
}

impl Number {
    /// Whole-number literal, as produced for `1` or an encoded integer.
    pub fn from_i64(value: i64) -> Self {
        Self {
            value: value as f64,
            has_fraction: false,
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self {
            value: value as f64,
            has_fraction: false,
        }
    }

    pub fn from_i128(value: i128) -> Self {
        Self {
            value: value as f64,
            has_fraction: false,
        }
    }

    pub fn from_u128(value: u128) -> Self {
        Self {
            value: value as f64,
            has_fraction: false,
        }
    }

    /// Float value; flagged as fractional only when it has a fractional part.
    /// Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        Self::with_fraction(value, value.fract() != 0.0)
    }

    /// Explicit flag, as the parser does when it has seen the lexeme.
    pub fn with_fraction(value: f64, has_fraction: bool) -> Option<Self> {
        value.is_finite().then_some(Self {
            value,
            has_fraction,
        })
    }

    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// Truncates toward zero, saturating at the `i64` bounds.
    pub fn as_i64(&self) -> i64 {
        self.value as i64
    }

    pub fn has_fraction(&self) -> bool {
        self.has_fraction
    }

    /// Integral and representable as `i64` without rounding.
    pub(crate) fn as_exact_i64(&self) -> Option<i64> {
        let v = self.value;
        (v.fract() == 0.0 && v >= -9_223_372_036_854_775_808.0 && v < 9_223_372_036_854_775_808.0)
            .then_some(v as i64)
    }

    pub(crate) fn write_json(&self, out: &mut String) {
        if !self.has_fraction {
            if let Some(i) = self.as_exact_i64() {
                let _ = write!(out, "{i}");
                return;
            }
            // Display never uses exponent notation, so no '.' or 'e' appears.
            let _ = write!(out, "{}", self.value);
            return;
        }
        // Debug is the shortest round-trip form and always carries '.' or 'e'.
        let _ = write!(out, "{:?}", self.value);
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_json(&mut out);
        f.write_str(&out)
    }
}

macro_rules! number_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Number {
            fn from(value: $ty) -> Self {
                Number::from_i64(value as i64)
            }
        })*
    };
}

macro_rules! number_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Number {
            fn from(value: $ty) -> Self {
                Number::from_u64(value as u64)
            }
        })*
    };
}

number_from_signed!(i8, i16, i32, i64, isize);
number_from_unsigned!(u8, u16, u32, u64, usize);
