//! Error types for parsing and for the serde bridge.
//!
//! Parsing and bridging fail in different ways: a [`ParseError`] points at a
//! byte offset in the input text, a [`CodingError`] points at a
//! [`CodingPath`] inside the value tree. [`Error`] wraps both for the
//! combined entry points such as [`crate::from_str`].

use std::fmt::Display;

use thiserror::Error;

use crate::path::{CodingPath, Path, PathComponent};
use crate::value::ValueKind;

/// Errors produced while turning text into a [`crate::Value`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input ended before the current value was complete.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("expected {expected} but found '{found}' at offset {offset}")]
    UnexpectedChar {
        found: char,
        expected: &'static str,
        offset: usize,
    },

    #[error("invalid number '{lexeme}' at offset {offset}")]
    InvalidNumber { lexeme: String, offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    /// A `\u` escape that is not four hex digits or names a lone surrogate.
    #[error("invalid unicode escape at offset {offset}")]
    InvalidUnicode { offset: usize },

    #[error("trailing characters at offset {offset}")]
    TrailingCharacters { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    DepthLimitExceeded { limit: usize, offset: usize },

    /// The document parsed, but its top-level value has the wrong kind.
    #[error("expected a top-level {expected} but found {found}")]
    UnexpectedRoot {
        expected: ValueKind,
        found: ValueKind,
    },
}

/// What went wrong during an encode or decode call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A required key is absent, or an unkeyed container was read past its end.
    #[error("missing value")]
    MissingValue,

    /// Invalid base64, an unparsable URL, a date that does not match the
    /// configured format and similar payload problems.
    #[error("malformed value: {message}")]
    MalformedSpecialValue { message: String },

    #[error("cannot encode non-finite float {value} without a string strategy")]
    InvalidFloatValue { value: f64 },

    #[error("{0}")]
    Custom(String),
}

/// A bridge failure together with the coding path where it happened.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {path}")]
pub struct CodingError {
    kind: ErrorKind,
    path: CodingPath,
    // Errors raised by derived code know only their position relative to the
    // container that called them; the first bridge frame they cross prefixes
    // its own path and marks them located.
    located: bool,
}

impl CodingError {
    /// An error with no location yet. Returned from custom date closures or
    /// hand-written serde impls, it is anchored at the position being coded.
    pub fn new(kind: ErrorKind) -> Self {
        Self::relative(kind, Vec::new())
    }

    pub(crate) fn at(kind: ErrorKind, path: &Path<'_>) -> Self {
        Self {
            kind,
            path: path.to_coding_path(),
            located: true,
        }
    }

    fn relative(kind: ErrorKind, components: Vec<PathComponent>) -> Self {
        Self {
            kind,
            path: CodingPath::from(components),
            located: false,
        }
    }

    pub(crate) fn type_mismatch(expected: &str, found: ValueKind, path: &Path<'_>) -> Self {
        Self::at(
            ErrorKind::TypeMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            },
            path,
        )
    }

    pub(crate) fn malformed(message: impl Into<String>, path: &Path<'_>) -> Self {
        Self::at(
            ErrorKind::MalformedSpecialValue {
                message: message.into(),
            },
            path,
        )
    }

    /// Anchor a relative error under `path`. Already located errors pass through.
    pub(crate) fn locate(mut self, path: &Path<'_>) -> Self {
        if !self.located {
            let mut full = path.to_coding_path();
            full.extend(std::mem::take(&mut self.path));
            self.path = full;
            self.located = true;
        }
        self
    }

    /// A free-form message raised while a visitor parsed a String payload
    /// (`url::Url` does this) describes a malformed value.
    pub(crate) fn custom_as_malformed(mut self) -> Self {
        if self.located || !self.path.is_empty() {
            return self;
        }
        if let ErrorKind::Custom(message) = &mut self.kind {
            let message = std::mem::take(message);
            self.kind = ErrorKind::MalformedSpecialValue { message };
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Location of the failure, from the root of the value tree.
    pub fn path(&self) -> &CodingPath {
        &self.path
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::TypeMismatch { .. })
    }

    pub fn is_missing_value(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingValue)
    }
}

impl serde::ser::Error for CodingError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::relative(ErrorKind::Custom(msg.to_string()), Vec::new())
    }
}

impl serde::de::Error for CodingError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::relative(ErrorKind::Custom(msg.to_string()), Vec::new())
    }

    fn invalid_type(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Self::relative(
            ErrorKind::TypeMismatch {
                expected: exp.to_string(),
                found: unexp.to_string(),
            },
            Vec::new(),
        )
    }

    fn invalid_value(unexp: serde::de::Unexpected<'_>, exp: &dyn serde::de::Expected) -> Self {
        Self::relative(
            ErrorKind::MalformedSpecialValue {
                message: format!("invalid value {unexp}, expected {exp}"),
            },
            Vec::new(),
        )
    }

    fn invalid_length(len: usize, _exp: &dyn serde::de::Expected) -> Self {
        Self::relative(ErrorKind::MissingValue, vec![PathComponent::Index(len)])
    }

    fn missing_field(field: &'static str) -> Self {
        Self::relative(
            ErrorKind::MissingValue,
            vec![PathComponent::Key(field.to_string())],
        )
    }
}

/// Errors from the combined text ⇄ typed value entry points.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("coding error: {0}")]
    Coding(#[from] CodingError),
}

/// Convenience alias used throughout yson-core.
pub type Result<T> = std::result::Result<T, Error>;
