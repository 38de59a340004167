//! Multi-valued attribute bags.
//!
//! An [`Attributes`] value is the unit every store reads and writes: an
//! insertion-ordered map from attribute name to one or more [`AttrValue`]s.
//! Adding a value to an attribute that already exists appends to it, which
//! is how multi-valued attributes such as aliases and public keys build up.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;

/// Inline capacity for attribute values. Most attributes hold exactly one.
pub type Values = SmallVec<[AttrValue; 1]>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Integer value (timestamps, counters).
    Int(i64),
    /// UTF-8 text value.
    Text(String),
}

impl AttrValue {
    /// Returns the text payload, or `None` for integers.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Int(_) => None,
        }
    }

    /// Returns the integer payload, or `None` for text.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Text(_) => None,
        }
    }

    /// Equality as the stores see it: integers and text compare by their
    /// rendered form, so `Int(5)` equals `Text("5")`.
    pub fn loosely_equals(&self, other: &AttrValue) -> bool {
        match (self, other) {
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            (a, b) => a.to_string() == b.to_string(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

/// Checks that `name` is usable as an attribute name.
pub fn validate_attr_name(name: &str) -> Result<(), CoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidAttributeName {
            name: name.to_string(),
        })
    }
}

/// An insertion-ordered, multi-valued attribute bag.
///
/// Equality ignores attribute order but not value order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    map: IndexMap<String, Values>,
}

impl Attributes {
    /// Creates an empty attribute bag.
    pub fn new() -> Self {
        Attributes {
            map: IndexMap::new(),
        }
    }

    /// Appends `value` to attribute `name`, creating the attribute if needed.
    pub fn add_value(&mut self, name: &str, value: AttrValue) -> Result<(), CoreError> {
        validate_attr_name(name)?;
        self.map.entry(name.to_string()).or_default().push(value);
        Ok(())
    }

    /// Appends a text value.
    pub fn add_string(&mut self, name: &str, value: &str) -> Result<(), CoreError> {
        self.add_value(name, AttrValue::from(value))
    }

    /// Appends an integer value.
    pub fn add_int(&mut self, name: &str, value: i64) -> Result<(), CoreError> {
        self.add_value(name, AttrValue::Int(value))
    }

    /// Replaces every value of attribute `name`. An empty iterator removes
    /// the attribute.
    pub fn set_values<I>(&mut self, name: &str, values: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = AttrValue>,
    {
        validate_attr_name(name)?;
        let values: Values = values.into_iter().collect();
        if values.is_empty() {
            self.map.shift_remove(name);
        } else {
            self.map.insert(name.to_string(), values);
        }
        Ok(())
    }

    /// Returns the values of attribute `name`, if present.
    pub fn get(&self, name: &str) -> Option<&[AttrValue]> {
        self.map.get(name).map(|v| v.as_slice())
    }

    /// Returns true when attribute `name` has at least one value.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Iterates over the text values of attribute `name`. Integer values are
    /// skipped.
    pub fn strings<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.map
            .get(name)
            .into_iter()
            .flat_map(|values| values.iter().filter_map(AttrValue::as_str))
    }

    /// Returns the first value of attribute `name` as text.
    pub fn first_string(&self, name: &str) -> Result<Option<&str>, CoreError> {
        match self.map.get(name).and_then(|v| v.first()) {
            None => Ok(None),
            Some(AttrValue::Text(s)) => Ok(Some(s)),
            Some(AttrValue::Int(_)) => Err(CoreError::TypeMismatch {
                attr: name.to_string(),
                expected: "text",
            }),
        }
    }

    /// Returns the first value of attribute `name` as an integer.
    pub fn first_int(&self, name: &str) -> Result<Option<i64>, CoreError> {
        match self.map.get(name).and_then(|v| v.first()) {
            None => Ok(None),
            Some(AttrValue::Int(v)) => Ok(Some(*v)),
            Some(AttrValue::Text(_)) => Err(CoreError::TypeMismatch {
                attr: name.to_string(),
                expected: "an integer",
            }),
        }
    }

    /// Removes attribute `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Values> {
        self.map.shift_remove(name)
    }

    /// Iterates over `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AttrValue])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct attributes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Attribute-level merge: every attribute in `other` replaces the values
    /// stored under the same name here. Attributes absent from `other` are
    /// kept untouched.
    pub fn merge_from(&mut self, other: &Attributes) {
        for (name, values) in &other.map {
            self.map.insert(name.clone(), values.clone());
        }
    }

    /// Returns a copy restricted to the attributes named in `wanted`.
    pub fn project(&self, wanted: &[&str]) -> Attributes {
        Attributes {
            map: self
                .map
                .iter()
                .filter(|(name, _)| wanted.contains(&name.as_str()))
                .map(|(name, values)| (name.clone(), values.clone()))
                .collect(),
        }
    }
}
