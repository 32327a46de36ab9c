//! Array nodes: ordered sequences of values.

use std::str::FromStr;

use crate::error::ParseError;
use crate::object::Object;
use crate::value::{Value, NULL};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    items: Vec<Value>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// The element at `index`, or the shared Null when out of bounds.
    pub fn get(&self, index: usize) -> &Value {
        self.items.get(index).unwrap_or(&NULL)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    /// Replace the element at `index`. `index == len` appends; anything
    /// further out is ignored.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) {
        if let Some(slot) = self.items.get_mut(index) {
            *slot = value.into();
        } else if index == self.items.len() {
            self.items.push(value.into());
        }
    }

    pub fn append(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    /// Insert before `index`, shifting later elements. Past the end appends.
    pub fn insert(&mut self, index: usize, value: impl Into<Value>) {
        let index = index.min(self.items.len());
        self.items.insert(index, value.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn get_bool(&self, index: usize) -> Option<bool> {
        match self.get(index) {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64() == 1),
            _ => None,
        }
    }

    pub fn get_i64(&self, index: usize) -> Option<i64> {
        self.get(index).as_i64()
    }

    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get(index).as_f64()
    }

    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).as_str()
    }

    pub fn get_object(&self, index: usize) -> Option<&Object> {
        self.get(index).as_object()
    }

    pub fn get_array(&self, index: usize) -> Option<&Array> {
        self.get(index).as_array()
    }
}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl From<Array> for Vec<Value> {
    fn from(array: Array) -> Self {
        array.items
    }
}

impl FromStr for Array {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse_array(s)
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
