//! Mapping validation against a template schema
//!
//! Backs the validate-mapping endpoint: find the required template fields
//! that have no non-blank entry in the submitted mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scribe_core::template::{FieldKind, TemplateField};

use crate::value::MappingValue;

/// Outcome of validating a data mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub missing_required_fields: Vec<String>,
}

impl ValidationResult {
    pub fn new(missing_required_fields: Vec<String>) -> Self {
        ValidationResult {
            valid: missing_required_fields.is_empty(),
            missing_required_fields,
        }
    }
}

/// Required `Scalar`/`Array` paths with no non-blank entry in the flat
/// mapping; `Object` fields recurse into their children.
pub fn find_missing_required_fields(
    fields: &[TemplateField],
    mapping: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing(fields, mapping, &mut missing);
    missing
}

fn collect_missing(fields: &[TemplateField], mapping: &BTreeMap<String, String>, missing: &mut Vec<String>) {
    for field in fields {
        match field.field_type {
            FieldKind::Scalar | FieldKind::Array => {
                if field.required && !has_non_blank(&field.path, mapping) {
                    missing.push(field.path.clone());
                }
            }
            FieldKind::Object => collect_missing(&field.children, mapping, missing),
        }
    }
}

fn has_non_blank(path: &str, mapping: &BTreeMap<String, String>) -> bool {
    mapping.get(path).is_some_and(|v| !v.trim().is_empty())
}

/// Like [`find_missing_required_fields`], but over the nested mapping shape
/// as emitted by the tree editor. An `Array` in per-field mode is checked on
/// its `_source` entry, and its required item fields are checked against the
/// per-item mapping.
pub fn find_missing_required_fields_nested(
    fields: &[TemplateField],
    mapping: &BTreeMap<String, MappingValue>,
) -> Vec<String> {
    let mut missing = Vec::new();
    collect_missing_nested(fields, mapping, &mut missing);
    missing
}

fn collect_missing_nested(
    fields: &[TemplateField],
    mapping: &BTreeMap<String, MappingValue>,
    missing: &mut Vec<String>,
) {
    for field in fields {
        let value = mapping.get(&field.name);
        match field.field_type {
            FieldKind::Scalar => {
                if field.required && !matches!(value, Some(MappingValue::Scalar(s)) if !s.trim().is_empty()) {
                    missing.push(field.path.clone());
                }
            }
            FieldKind::Object => {
                let empty = BTreeMap::new();
                let nested = match value {
                    Some(MappingValue::Object(children)) => children,
                    _ => &empty,
                };
                collect_missing_nested(&field.children, nested, missing);
            }
            FieldKind::Array => {
                let source_set = match value {
                    Some(MappingValue::Scalar(s)) => !s.trim().is_empty(),
                    Some(MappingValue::Array(array)) => !array.source.trim().is_empty(),
                    _ => false,
                };
                if field.required && !source_set {
                    missing.push(field.path.clone());
                }
                if let Some(MappingValue::Array(array)) = value {
                    for child in &field.children {
                        if child.required
                            && child.field_type != FieldKind::Object
                            && !array.item_fields.get(&child.name).is_some_and(|v| !v.trim().is_empty())
                        {
                            missing.push(child.path.clone());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<TemplateField> {
        vec![
            TemplateField::scalar("customerName", true),
            TemplateField::with_children(
                "invoice",
                FieldKind::Object,
                false,
                vec![TemplateField::scalar("invoice.date", true)],
            ),
            TemplateField::leaf("items", FieldKind::Array, true),
        ]
    }

    #[test]
    fn test_all_required_missing_on_empty_mapping() {
        let missing = find_missing_required_fields(&schema(), &BTreeMap::new());
        assert_eq!(missing, vec!["customerName", "invoice.date", "items"]);
        assert!(!ValidationResult::new(missing).valid);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let mut mapping = BTreeMap::new();
        mapping.insert("customerName".to_string(), "   ".to_string());
        let missing = find_missing_required_fields(&schema(), &mapping);
        assert!(missing.contains(&"customerName".to_string()));
    }

    #[test]
    fn test_fully_mapped_is_valid() {
        let mut mapping = BTreeMap::new();
        mapping.insert("customerName".to_string(), "doc:customer.name".to_string());
        mapping.insert("invoice.date".to_string(), "pv:today".to_string());
        mapping.insert("items".to_string(), "pv:lines".to_string());
        let result = ValidationResult::new(find_missing_required_fields(&schema(), &mapping));
        assert!(result.valid);
        assert!(result.missing_required_fields.is_empty());
    }

    #[test]
    fn test_nested_validation_follows_the_tree() {
        let mapping = crate::value::nested_from_json(&serde_json::json!({
            "invoice": {"date": "pv:today"}
        }));
        let missing = find_missing_required_fields_nested(&schema(), &mapping);
        assert_eq!(missing, vec!["customerName", "items"]);
    }

    #[test]
    fn test_nested_validation_checks_array_item_fields() {
        let fields = vec![TemplateField::with_children(
            "items",
            FieldKind::Array,
            true,
            vec![
                TemplateField::scalar("items.sku", true),
                TemplateField::scalar("items.label", false),
            ],
        )];
        let mapping = crate::value::nested_from_json(&serde_json::json!({
            "items": {"_source": "pv:lines"}
        }));
        let missing = find_missing_required_fields_nested(&fields, &mapping);
        assert_eq!(missing, vec!["items.sku"]);
    }

    #[test]
    fn test_wire_shape() {
        let result = ValidationResult::new(vec!["customerName".to_string()]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"valid": false, "missingRequiredFields": ["customerName"]})
        );
    }
}
