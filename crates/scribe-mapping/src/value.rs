//! Typed mapping values
//!
//! The host exchanges nested mappings as untyped JSON (`Record<string, any>`).
//! Internally a value is one of three shapes: a scalar source expression, an
//! object of child mappings, or an array mapping carrying a collection source
//! expression plus optional per-item field mappings.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Key inside an array mapping object that holds the collection source
/// expression. An object containing this key is a per-item field mapping,
/// not a plain nested object.
pub const ARRAY_SOURCE_KEY: &str = "_source";

/// A single mapped template field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingValue {
    /// Source expression for a scalar leaf, or a whole collection (direct mode)
    Scalar(String),
    /// Child name to value, mirroring an `Object` template field
    Object(BTreeMap<String, MappingValue>),
    /// Per-field array mapping: collection source plus item field renames
    Array(ArrayMapping),
}

/// Array mapping in per-field mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrayMapping {
    /// Collection source expression (what `_source` holds on the wire)
    pub source: String,
    /// Template item field name to source item field name
    pub item_fields: BTreeMap<String, String>,
}

impl MappingValue {
    /// Convert an untyped JSON value into a typed mapping value.
    ///
    /// Malformed input is coerced, never an error: numbers and booleans are
    /// stringified, empty strings and empty objects become `None` (absence is
    /// the canonical unmapped representation), and shapes with no meaningful
    /// interpretation (null, JSON arrays) are dropped.
    pub fn from_json(value: &Value) -> Option<MappingValue> {
        match value {
            Value::String(s) => {
                if s.trim().is_empty() {
                    None
                } else {
                    Some(MappingValue::Scalar(s.clone()))
                }
            }
            Value::Number(n) => Some(MappingValue::Scalar(n.to_string())),
            Value::Bool(b) => Some(MappingValue::Scalar(b.to_string())),
            Value::Object(map) if map.contains_key(ARRAY_SOURCE_KEY) => {
                let source = map
                    .get(ARRAY_SOURCE_KEY)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let item_fields = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != ARRAY_SOURCE_KEY)
                    .filter_map(|(key, val)| {
                        val.as_str()
                            .filter(|s| !s.trim().is_empty())
                            .map(|s| (key.clone(), s.to_string()))
                    })
                    .collect();
                Some(MappingValue::Array(ArrayMapping { source, item_fields }))
            }
            Value::Object(map) => {
                let children: BTreeMap<String, MappingValue> = map
                    .iter()
                    .filter_map(|(key, val)| MappingValue::from_json(val).map(|v| (key.clone(), v)))
                    .collect();
                if children.is_empty() {
                    None
                } else {
                    Some(MappingValue::Object(children))
                }
            }
            _ => None,
        }
    }

    /// Convert back to the wire shape
    pub fn to_json(&self) -> Value {
        match self {
            MappingValue::Scalar(s) => Value::String(s.clone()),
            MappingValue::Object(children) => {
                let mut map = Map::new();
                for (name, value) in children {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
            MappingValue::Array(array) => {
                let mut map = Map::new();
                map.insert(ARRAY_SOURCE_KEY.to_string(), Value::String(array.source.clone()));
                for (name, source_field) in &array.item_fields {
                    map.insert(name.clone(), Value::String(source_field.clone()));
                }
                Value::Object(map)
            }
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            MappingValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

/// Parse a whole nested mapping payload; non-object payloads coerce to empty
pub fn nested_from_json(value: &Value) -> BTreeMap<String, MappingValue> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, val)| MappingValue::from_json(val).map(|v| (key.clone(), v)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Serialize a nested mapping for the host
pub fn nested_to_json(mapping: &BTreeMap<String, MappingValue>) -> Value {
    let mut map = Map::new();
    for (name, value) in mapping {
        map.insert(name.clone(), value.to_json());
    }
    Value::Object(map)
}
