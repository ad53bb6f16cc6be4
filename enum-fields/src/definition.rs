//! Definition normalizer.
//!
//! A raw definition arrives as JSON in one of two shapes:
//!
//! - a mapping from key to partial metadata: `{"active": {"value": "active", "label": "Active"}}`
//! - a flat sequence of scalars: `["active", "archived"]`
//!
//! Both normalize into one [`EnumDefinition`]: an ordered, immutable mapping from text key to
//! [`Metadata`], where every entry carries a `value` and a `label`.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::DefinitionError;

/// Property every metadata entry must carry.
pub const VALUE: &str = "value";
/// Property defaulted from `value` when an entry omits it.
pub const LABEL: &str = "label";
/// Properties present on every definition, whatever its entries declare.
pub const STANDARD_PROPERTIES: [&str; 2] = [VALUE, LABEL];

/// Canonical text form of a definition key.
///
/// Keys are compared as text at every lookup boundary. Strings are used as-is, numbers and
/// booleans are rendered, anything else has no key form.
pub fn key_text(raw: &Value) -> Option<Cow<'_, str>> {
    match raw {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}

/// Per-key property mapping (`value`, `label`, and any extras such as `icon` or `color`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    fn from_partial(mut properties: Map<String, Value>) -> Self {
        if !properties.contains_key(LABEL)
            && let Some(value) = properties.get(VALUE).cloned()
        {
            properties.insert(LABEL.to_string(), value);
        }
        Self(properties)
    }

    fn from_scalar(scalar: &Value) -> Self {
        let mut properties = Map::new();
        properties.insert(VALUE.to_string(), scalar.clone());
        properties.insert(LABEL.to_string(), scalar.clone());
        Self(properties)
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.0.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    /// The stored value this entry stands for.
    pub fn value(&self) -> &Value {
        self.0.get(VALUE).unwrap_or(&Value::Null)
    }

    pub fn label(&self) -> &Value {
        self.0.get(LABEL).unwrap_or(&Value::Null)
    }

    /// Property names in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Union of the standard properties and every property any entry declares, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertySet(Vec<String>);

impl PropertySet {
    fn collect<'a>(entries: impl Iterator<Item = &'a Metadata>) -> Self {
        let mut names: Vec<String> = STANDARD_PROPERTIES.iter().map(|name| name.to_string()).collect();
        for metadata in entries {
            for property in metadata.properties() {
                if !names.iter().any(|known| known == property) {
                    names.push(property.to_string());
                }
            }
        }
        Self(names)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.iter().any(|name| name == property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalized, ordered key to [`Metadata`] mapping. Source of truth for one enum field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    entries: Vec<(String, Metadata)>,
    index: HashMap<String, usize>,
    properties: PropertySet,
}

impl EnumDefinition {
    /// Normalizes and validates a raw definition.
    ///
    /// Any shape other than a mapping of mappings or a sequence of scalars is rejected with
    /// [`DefinitionError::Invalid`], as is any entry lacking a `value` after normalization.
    pub fn new(raw: &Value) -> Result<Self, DefinitionError> {
        let mut definition = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            properties: PropertySet(Vec::new()),
        };

        match raw {
            Value::Object(map) => {
                for (key, metadata) in map {
                    let Value::Object(properties) = metadata else {
                        return Err(DefinitionError::invalid(format!(
                            "entry '{key}' must be a mapping of properties, got {}",
                            shape_name(metadata)
                        )));
                    };
                    definition.upsert(key.clone(), Metadata::from_partial(properties.clone()));
                }
            }
            Value::Array(items) => {
                for item in items {
                    let key = key_text(item).ok_or_else(|| {
                        DefinitionError::invalid(format!(
                            "sequence entries must be scalars, got {}",
                            shape_name(item)
                        ))
                    })?;
                    definition.upsert(key.into_owned(), Metadata::from_scalar(item));
                }
            }
            other => {
                return Err(DefinitionError::invalid(format!(
                    "definitions must be a mapping or a sequence, got {}",
                    shape_name(other)
                )));
            }
        }

        if let Some((key, _)) = definition.entries.iter().find(|(_, metadata)| !metadata.contains(VALUE)) {
            return Err(DefinitionError::invalid(format!("entry '{key}' is missing a value")));
        }

        definition.properties = PropertySet::collect(definition.entries.iter().map(|(_, metadata)| metadata));
        Ok(definition)
    }

    // Later duplicates replace the earlier metadata but keep the first position.
    fn upsert(&mut self, key: String, metadata: Metadata) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = metadata,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, metadata));
            }
        }
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&Metadata> {
        self.index.get(key.as_ref()).map(|&position| &self.entries[position].1)
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.index.contains_key(key.as_ref())
    }

    /// Nested lookup of one property of one entry.
    pub fn dig(&self, key: impl AsRef<str>, property: &str) -> Option<&Value> {
        self.get(key).and_then(|metadata| metadata.get(property))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Metadata)> {
        self.entries.iter().map(|(key, metadata)| (key.as_str(), metadata))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Metadata entries in definition order.
    pub fn values(&self) -> impl Iterator<Item = &Metadata> {
        self.entries.iter().map(|(_, metadata)| metadata)
    }

    /// The `value` of every entry, in definition order.
    pub fn entry_values(&self) -> Vec<&Value> {
        self.values().map(Metadata::value).collect()
    }

    /// `(label, key)` pairs in definition order, suitable for select inputs.
    pub fn options(&self) -> Vec<(&Value, &str)> {
        self.iter().map(|(key, metadata)| (metadata.label(), key)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the definition has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn properties(&self) -> &PropertySet {
        &self.properties
    }

    /// First entry, in definition order, whose `value` equals `value`.
    pub fn find_by_value(&self, value: &Value) -> Option<(&str, &Metadata)> {
        self.iter().find(|(_, metadata)| metadata.value() == value)
    }

    /// Resolves a stored column value to its metadata.
    ///
    /// The value is tried as a key first, then matched against every entry's `value`.
    /// `null` never resolves.
    pub fn lookup(&self, column_value: &Value) -> Option<&Metadata> {
        if column_value.is_null() {
            return None;
        }
        if let Value::String(key) = column_value
            && let Some(metadata) = self.get(key)
        {
            return Some(metadata);
        }
        self.find_by_value(column_value).map(|(_, metadata)| metadata)
    }

    /// Values declared under more than one key. Such definitions are accepted as-is.
    pub fn duplicate_values(&self) -> Vec<&Value> {
        let mut seen: Vec<&Value> = Vec::new();
        let mut duplicates: Vec<&Value> = Vec::new();
        for value in self.values().map(Metadata::value) {
            if seen.contains(&value) {
                if !duplicates.contains(&value) {
                    duplicates.push(value);
                }
            } else {
                seen.push(value);
            }
        }
        duplicates
    }

    /// Plain JSON form of the normalized data, in definition order.
    pub fn to_value(&self) -> Value {
        let data = self
            .entries
            .iter()
            .map(|(key, metadata)| (key.clone(), metadata.to_value()))
            .collect::<Map<String, Value>>();
        Value::Object(data)
    }
}

impl Serialize for EnumDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, metadata) in &self.entries {
            map.serialize_entry(key, metadata)?;
        }
        map.end()
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
