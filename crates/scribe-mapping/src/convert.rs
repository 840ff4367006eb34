//! Conversion between the flat and nested mapping shapes
//!
//! The flat shape keys leaf expressions by template field path; the nested
//! shape mirrors the template tree. Both are lossless given the schema: the
//! schema supplies the nesting, the flat form supplies only leaf values.
//! Array per-item entries exist only in the nested shape.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use scribe_core::template::{FieldKind, TemplateField};

use crate::value::MappingValue;

/// Convert a flat dot-notation map into a nested JSON structure without a
/// schema, e.g. `{"invoice.date": "x"}` into `{"invoice": {"date": "x"}}`.
///
/// Later entries merge into objects created by earlier ones; a scalar
/// colliding with an intermediate segment is overwritten by the object.
pub fn nest(flat: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in flat {
        let mut parts = key.split('.').collect::<Vec<_>>();
        let leaf = parts.pop().unwrap_or(key.as_str());
        let mut current = &mut result;
        for part in parts {
            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry
                .as_object_mut()
                .expect("entry was just ensured to be an object above");
        }
        current.insert(leaf.to_string(), value.clone());
    }
    result
}

/// Expand a flat path-keyed mapping into the nested shape, guided by the
/// schema. Empty values are skipped; fields absent from the flat mapping are
/// absent from the result. Array entries become direct-mode scalars.
pub fn expand(flat: &BTreeMap<String, String>, fields: &[TemplateField]) -> BTreeMap<String, MappingValue> {
    let mut result = BTreeMap::new();
    for field in fields {
        let value = match field.field_type {
            FieldKind::Scalar | FieldKind::Array => flat
                .get(&field.path)
                .filter(|v| !v.trim().is_empty())
                .map(|v| MappingValue::Scalar(v.clone())),
            FieldKind::Object => {
                let children = expand(flat, &field.children);
                if children.is_empty() {
                    None
                } else {
                    Some(MappingValue::Object(children))
                }
            }
        };
        if let Some(value) = value {
            result.insert(field.name.clone(), value);
        }
    }
    result
}

/// Flatten a nested mapping back into the flat path-keyed shape, guided by
/// the schema. Array per-field entries have no flat counterpart and are
/// skipped; only their collection source survives as a direct entry.
pub fn flatten(nested: &BTreeMap<String, MappingValue>, fields: &[TemplateField]) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    collect_flat(nested, fields, &mut result);
    result
}

fn collect_flat(
    nested: &BTreeMap<String, MappingValue>,
    fields: &[TemplateField],
    result: &mut BTreeMap<String, String>,
) {
    for field in fields {
        match (field.field_type, nested.get(&field.name)) {
            (FieldKind::Scalar, Some(MappingValue::Scalar(value))) if !value.trim().is_empty() => {
                result.insert(field.path.clone(), value.clone());
            }
            (FieldKind::Array, Some(MappingValue::Scalar(value))) if !value.trim().is_empty() => {
                result.insert(field.path.clone(), value.clone());
            }
            (FieldKind::Array, Some(MappingValue::Array(array))) if !array.source.trim().is_empty() => {
                result.insert(field.path.clone(), array.source.clone());
            }
            (FieldKind::Object, Some(MappingValue::Object(children))) => {
                collect_flat(children, &field.children, result);
            }
            _ => {}
        }
    }
}

/// Rename the fields of each source item according to the per-item mapping
/// (template field name to source field name). Items that are not objects
/// are skipped; with no field mappings, object items pass through as-is.
pub fn map_array_items(items: &[Value], field_mappings: &BTreeMap<String, String>) -> Vec<Value> {
    if field_mappings.is_empty() {
        return items.iter().filter(|item| item.is_object()).cloned().collect();
    }
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let mut mapped = Map::new();
            for (template_field, source_field) in field_mappings {
                mapped.insert(
                    template_field.clone(),
                    item.get(source_field).cloned().unwrap_or(Value::Null),
                );
            }
            Value::Object(mapped)
        })
        .collect()
}
