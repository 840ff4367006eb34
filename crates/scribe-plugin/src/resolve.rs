//! Execution-time resolution of a nested data mapping
//!
//! Walks the configured mapping tree, collects every resolvable source
//! expression in one pass, batch-resolves them through the host's value
//! resolver, and builds the resolved tree the Scribe API receives. For a
//! per-field array mapping only the `_source` expression is resolvable; the
//! other entries are plain item field names.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use scribe_mapping::convert::map_array_items;
use scribe_mapping::{is_resolvable, ARRAY_SOURCE_KEY};

/// Whether a mapping value is a per-item array field mapping
pub fn is_array_field_mapping(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.contains_key(ARRAY_SOURCE_KEY))
}

/// Collect all resolvable string expressions from the mapping tree
pub fn collect_resolvable_values(mapping: &Map<String, Value>, out: &mut Vec<String>) {
    for value in mapping.values() {
        match value {
            Value::String(s) if is_resolvable(s) => out.push(s.clone()),
            _ if is_array_field_mapping(value) => {
                if let Some(Value::String(source)) = value.get(ARRAY_SOURCE_KEY) {
                    if is_resolvable(source) {
                        out.push(source.clone());
                    }
                }
            }
            Value::Object(nested) => collect_resolvable_values(nested, out),
            _ => {}
        }
    }
}

/// Rebuild the mapping tree with batch-resolved values substituted in.
/// Strings without a resolver prefix pass through as literals.
pub fn apply_resolved_values(mapping: &Map<String, Value>, resolved: &BTreeMap<String, Value>) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in mapping {
        let resolved_value = if is_array_field_mapping(value) {
            match value.as_object() {
                Some(array_mapping) => resolve_array_field_mapping(array_mapping, resolved),
                None => value.clone(),
            }
        } else {
            match value {
                Value::Object(nested) => Value::Object(apply_resolved_values(nested, resolved)),
                Value::String(s) if is_resolvable(s) => resolved.get(s).cloned().unwrap_or(Value::Null),
                other => other.clone(),
            }
        };
        result.insert(key.clone(), resolved_value);
    }
    result
}

/// Resolve a per-item array field mapping: the `_source` expression yields
/// the source list, then the item field renames are applied to each item.
fn resolve_array_field_mapping(array_mapping: &Map<String, Value>, resolved: &BTreeMap<String, Value>) -> Value {
    let source_expression = array_mapping.get(ARRAY_SOURCE_KEY).and_then(Value::as_str);
    let resolved_source = match source_expression {
        Some(expr) if is_resolvable(expr) => resolved.get(expr).cloned().unwrap_or(Value::Null),
        Some(expr) => Value::String(expr.to_string()),
        None => Value::Null,
    };

    let field_mappings: BTreeMap<String, String> = array_mapping
        .iter()
        .filter(|(key, _)| key.as_str() != ARRAY_SOURCE_KEY)
        .filter_map(|(key, val)| val.as_str().map(|s| (key.clone(), s.to_string())))
        .collect();

    match resolved_source {
        Value::Array(items) => Value::Array(map_array_items(&items, &field_mappings)),
        other => {
            // The source did not resolve to a list; hand it through untouched
            tracing::warn!(source = ?source_expression, "array mapping source did not resolve to a list");
            other
        }
    }
}
