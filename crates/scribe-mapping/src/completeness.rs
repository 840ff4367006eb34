//! Required-field completeness accounting
//!
//! Recomputed from scratch after every mutation by walking the template tree
//! in lock-step with the mapping. Only required `Scalar` and `Array` leaves
//! count; `Object` nodes recurse without counting themselves. An `Array` in
//! per-field mode additionally counts its required item fields, each checked
//! independently against the per-item mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scribe_core::template::{FieldKind, TemplateField};

use crate::value::MappingValue;

/// How many required fields are mapped, out of how many exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessStats {
    pub mapped: usize,
    pub total: usize,
}

impl CompletenessStats {
    pub fn is_complete(&self) -> bool {
        self.mapped >= self.total
    }

    fn add(&mut self, other: CompletenessStats) {
        self.mapped += other.mapped;
        self.total += other.total;
    }
}

/// Completeness of a nested mapping against the schema
pub fn count_required_mapped(
    fields: &[TemplateField],
    mapping: &BTreeMap<String, MappingValue>,
) -> CompletenessStats {
    let mut stats = CompletenessStats::default();
    for field in fields {
        stats.add(node_stats(field, mapping.get(&field.name)));
    }
    stats
}

/// Completeness contribution of a single field node given its current value.
///
/// Used both for the overall stats and for per-node badges on collapsed
/// sections of the tree editor.
pub fn node_stats(field: &TemplateField, value: Option<&MappingValue>) -> CompletenessStats {
    let mut stats = CompletenessStats::default();
    match field.field_type {
        FieldKind::Scalar => {
            if field.required {
                stats.total += 1;
                if non_blank_scalar(value) {
                    stats.mapped += 1;
                }
            }
        }
        FieldKind::Object => {
            let empty = BTreeMap::new();
            let nested = match value {
                Some(MappingValue::Object(children)) => children,
                _ => &empty,
            };
            stats.add(count_required_mapped(&field.children, nested));
        }
        FieldKind::Array => {
            if field.required {
                stats.total += 1;
                if array_source_set(value) {
                    stats.mapped += 1;
                }
            }
            // Per-field mode: required item fields count independently
            if let Some(MappingValue::Array(array)) = value {
                for child in &field.children {
                    if child.required && child.field_type != FieldKind::Object {
                        stats.total += 1;
                        if array
                            .item_fields
                            .get(&child.name)
                            .is_some_and(|v| !v.trim().is_empty())
                        {
                            stats.mapped += 1;
                        }
                    }
                }
            }
        }
    }
    stats
}

/// Completeness of a flat path-keyed mapping against the schema
pub fn count_required_mapped_flat(
    fields: &[TemplateField],
    mapping: &BTreeMap<String, String>,
) -> CompletenessStats {
    let required = scribe_core::schema::collect_required_paths(fields);
    let mapped = required
        .iter()
        .filter(|path| mapping.get(*path).is_some_and(|v| !v.trim().is_empty()))
        .count();
    CompletenessStats {
        mapped,
        total: required.len(),
    }
}

fn non_blank_scalar(value: Option<&MappingValue>) -> bool {
    matches!(value, Some(MappingValue::Scalar(s)) if !s.trim().is_empty())
}

fn array_source_set(value: Option<&MappingValue>) -> bool {
    match value {
        Some(MappingValue::Scalar(s)) => !s.trim().is_empty(),
        Some(MappingValue::Array(array)) => !array.source.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::nested_from_json;
    use scribe_core::template::TemplateField;
    use serde_json::json;

    fn schema() -> Vec<TemplateField> {
        vec![
            TemplateField::scalar("customerName", true),
            TemplateField::scalar("amount", true),
            TemplateField::scalar("notes", false),
        ]
    }

    #[test]
    fn test_empty_mapping() {
        let stats = count_required_mapped(&schema(), &BTreeMap::new());
        assert_eq!(stats, CompletenessStats { mapped: 0, total: 2 });
    }

    #[test]
    fn test_partial_mapping() {
        let mapping = nested_from_json(&json!({"customerName": "doc:customer.name"}));
        let stats = count_required_mapped(&schema(), &mapping);
        assert_eq!(stats, CompletenessStats { mapped: 1, total: 2 });
    }

    #[test]
    fn test_optional_fields_never_count() {
        let mapping = nested_from_json(&json!({"notes": "pv:remark"}));
        let stats = count_required_mapped(&schema(), &mapping);
        assert_eq!(stats, CompletenessStats { mapped: 0, total: 2 });
    }

    #[test]
    fn test_object_recursion_counts_leaves_once() {
        let fields = vec![TemplateField::with_children(
            "invoice",
            FieldKind::Object,
            false,
            vec![
                TemplateField::scalar("invoice.date", true),
                TemplateField::scalar("invoice.reference", false),
            ],
        )];
        let mapping = nested_from_json(&json!({"invoice": {"date": "doc:invoice.date"}}));
        let stats = count_required_mapped(&fields, &mapping);
        assert_eq!(stats, CompletenessStats { mapped: 1, total: 1 });
    }

    #[test]
    fn test_array_direct_mode_is_binary() {
        let fields = vec![TemplateField::with_children(
            "items",
            FieldKind::Array,
            true,
            vec![TemplateField::scalar("items.sku", true)],
        )];
        let mapping = nested_from_json(&json!({"items": "pv:lines"}));
        let stats = count_required_mapped(&fields, &mapping);
        assert_eq!(stats, CompletenessStats { mapped: 1, total: 1 });
    }

    #[test]
    fn test_array_per_field_mode_counts_item_fields() {
        let fields = vec![TemplateField::with_children(
            "items",
            FieldKind::Array,
            true,
            vec![TemplateField::scalar("items.sku", true)],
        )];
        let mapping = nested_from_json(&json!({"items": {"_source": "pv:lines", "sku": "code"}}));
        let stats = count_required_mapped(&fields, &mapping);
        assert_eq!(stats, CompletenessStats { mapped: 2, total: 2 });
    }

    #[test]
    fn test_flat_counting_matches_required_paths() {
        let mut flat = BTreeMap::new();
        flat.insert("customerName".to_string(), "doc:customer.name".to_string());
        flat.insert("notes".to_string(), "spurious".to_string());
        let stats = count_required_mapped_flat(&schema(), &flat);
        assert_eq!(stats, CompletenessStats { mapped: 1, total: 2 });
    }
}
