//! Object nodes: string keys to values, unordered.

use std::collections::hash_map::{self, HashMap};
use std::str::FromStr;

use crate::array::Array;
use crate::error::ParseError;
use crate::value::{Value, NULL};

/// Unordered map from key to [`Value`]. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    members: HashMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: HashMap::with_capacity(capacity),
        }
    }

    /// The member at `key`, or the shared Null when absent.
    pub fn get(&self, key: &str) -> &Value {
        self.members.get(key).unwrap_or(&NULL)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.members.get_mut(key)
    }

    /// Insert or replace; returns the previous member.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.members.remove(key)
    }

    /// True when the key is present, including when it maps to Null.
    pub fn has(&self, key: &str) -> bool {
        self.members.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.members.values()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    // Typed lookups. A missing key and a kind mismatch both give `None`.

    /// Bools as-is; numbers are `true` when they truncate to 1.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64() == 1),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).as_i64()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).as_f64()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).as_str()
    }

    pub fn get_object(&self, key: &str) -> Option<&Object> {
        self.get(key).as_object()
    }

    pub fn get_array(&self, key: &str) -> Option<&Array> {
        self.get(key).as_array()
    }
}

impl FromStr for Object {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_object(s)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            members: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Object {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
