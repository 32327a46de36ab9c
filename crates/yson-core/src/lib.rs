//! # yson-core
//!
//! A self-contained JSON value tree, a recursive-descent parser that builds it,
//! and a serde bridge that converts any `Serialize`/`Deserialize` type to and
//! from the tree.
//!
//! ## Quick start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use yson_core::{from_value, parse_value, to_value};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! // Text → tree
//! let tree = parse_value(r#"{"name":"Ada","age":36}"#).unwrap();
//! assert_eq!(tree.as_object().unwrap().get_str("name"), Some("Ada"));
//!
//! // Tree → typed value → tree
//! let user: User = from_value(&tree).unwrap();
//! assert_eq!(user, User { name: "Ada".into(), age: 36 });
//! assert_eq!(to_value(&user).unwrap(), tree);
//! ```
//!
//! ## Modules
//!
//! - [`value`], [`number`], [`object`], [`array`]: the value tree
//! - [`parser`]: JSON text → [`Value`]
//! - [`bridge`]: [`Bridge`] and its strategies; `to_value` / `from_value`
//! - [`encoder`] / [`decoder`]: the serde `Serializer` / `Deserializer`
//! - [`date`], [`decimal`], [`blob`]: `#[serde(with = ...)]` adapters for
//!   the bridge's special types
//! - [`path`]: coding paths attached to bridge errors
//! - [`error`]: [`ParseError`], [`CodingError`] and the combined [`Error`]

pub mod array;
pub mod blob;
pub mod bridge;
pub mod date;
pub mod decimal;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod number;
pub mod object;
pub mod parser;
pub mod path;
pub mod value;
mod value_serde;

pub use array::Array;
pub use bridge::{
    from_str, from_value, to_string, to_value, BlobStrategy, Bridge, DateStrategy,
    NonFiniteFloatStrategy,
};
pub use error::{CodingError, Error, ErrorKind, ParseError, Result};
pub use number::Number;
pub use object::Object;
pub use parser::{
    parse_array, parse_object, parse_value, parse_value_with, ParserOptions, DEFAULT_MAX_DEPTH,
};
pub use path::{CodingPath, PathComponent};
pub use value::{Value, ValueKind, NULL};

/// Compact JSON text for `value`. Same as [`Value::to_json`].
pub fn serialize(value: &Value) -> String {
    value.to_json()
}
