//! Nested tree editor
//!
//! Recursive per-field editing over the nested mapping shape. Each node has
//! an input mode (browse / process variable / expression) derived from its
//! current value, an expansion flag for collapsible sections, and, for array
//! nodes, a per-field mode derived from the value shape. Empty objects are
//! pruned on every edit so the emitted mapping stays minimal and comparable.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use scribe_core::template::{FieldKind, TemplateField};

use crate::completeness::{self, CompletenessStats};
use crate::expression::{classify, SourceKind};
use crate::value::{nested_from_json, nested_to_json, ArrayMapping, MappingValue};

/// How the user supplies a value for one field node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Pick a document/case path from the data model browser
    Browse,
    /// Pick a process variable
    ProcessVariable,
    /// Type a literal or free-form expression
    Expression,
}

impl InputMode {
    fn derive(value: Option<&str>) -> Self {
        match classify(value.unwrap_or_default()) {
            SourceKind::ProcessVariable => InputMode::ProcessVariable,
            SourceKind::Manual => InputMode::Expression,
            SourceKind::Document | SourceKind::Empty => InputMode::Browse,
        }
    }
}

#[derive(Debug, Default)]
struct NodeState {
    /// Mode chosen by an explicit user toggle; wins over passive
    /// re-derivation until the next wholesale schema/prefill replacement.
    explicit_mode: Option<InputMode>,
    /// Expansion chosen by an explicit user toggle
    explicit_expanded: Option<bool>,
}

/// Stateful editor over the nested mapping, walking the template tree in
/// lock-step with the mapping values.
#[derive(Debug, Default)]
pub struct TreeEditor {
    fields: Vec<TemplateField>,
    mapping: BTreeMap<String, MappingValue>,
    nodes: HashMap<String, NodeState>,
}

impl TreeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[TemplateField] {
        &self.fields
    }

    pub fn mapping(&self) -> &BTreeMap<String, MappingValue> {
        &self.mapping
    }

    /// The emitted nested mapping in its wire shape
    pub fn mapping_json(&self) -> Value {
        nested_to_json(&self.mapping)
    }

    /// Replace the template schema wholesale. The mapping is kept: prefill
    /// and schema arrive independently and in either order. Per-node user
    /// state is discarded and re-derived against the new tree.
    pub fn set_template_fields(&mut self, fields: Vec<TemplateField>) {
        self.fields = fields;
        self.nodes.clear();
    }

    /// Replace the mapping wholesale from an external payload (last write
    /// wins; malformed payloads coerce to empty). Input modes are re-derived
    /// from the new values; earlier user toggles are superseded.
    pub fn load_prefill(&mut self, prefill: &Value) {
        self.mapping = nested_from_json(prefill);
        self.nodes.clear();
    }

    /// Current value of the node at `path`, if mapped
    pub fn value(&self, path: &str) -> Option<&MappingValue> {
        let chain = field_chain(&self.fields, path)?;
        let mut current = self.mapping.get(&chain[0].name)?;
        for field in &chain[1..] {
            match current {
                MappingValue::Object(children) => current = children.get(&field.name)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Set a leaf value. For scalar fields this replaces the stored
    /// expression; an empty value removes the entry (absence is the
    /// canonical unmapped representation). For array fields this sets the
    /// collection source, in whichever mode the node currently is. Returns
    /// true when the emitted mapping changed.
    pub fn set_value(&mut self, path: &str, value: &str) -> bool {
        let Some(chain) = field_chain(&self.fields, path) else {
            return false;
        };
        let Some(field) = chain.last().copied() else {
            return false;
        };
        let new_value = match field.field_type {
            FieldKind::Object => return false,
            FieldKind::Scalar => non_blank(value).map(|v| MappingValue::Scalar(v.to_string())),
            FieldKind::Array => match self.value(path) {
                Some(MappingValue::Array(array)) => {
                    // Per-field mode: the source lives under `_source`; an
                    // emptied source keeps the per-item entries alive.
                    let mut array = array.clone();
                    array.source = value.trim().to_string();
                    if array.source.is_empty() && array.item_fields.is_empty() {
                        None
                    } else {
                        Some(MappingValue::Array(array))
                    }
                }
                _ => non_blank(value).map(|v| MappingValue::Scalar(v.to_string())),
            },
        };
        let chain: Vec<String> = chain.iter().map(|f| f.name.clone()).collect();
        apply_at(&mut self.mapping, &chain, new_value)
    }

    /// Whether the array node at `path` maps items field by field
    pub fn per_field_mode(&self, path: &str) -> bool {
        matches!(self.value(path), Some(MappingValue::Array(_)))
    }

    /// Toggle an array node between direct and per-field mode.
    ///
    /// Switching on wraps the bare collection expression as the `_source`
    /// entry; switching off extracts it back and discards any per-item
    /// mappings — an explicit, lossy, user-initiated transition.
    pub fn set_per_field_mode(&mut self, path: &str, enabled: bool) -> bool {
        let Some(chain) = field_chain(&self.fields, path) else {
            return false;
        };
        let Some(field) = chain.last().copied() else {
            return false;
        };
        if field.field_type != FieldKind::Array {
            return false;
        }
        let new_value = match (self.value(path), enabled) {
            (Some(MappingValue::Array(_)), true) | (None, false) => return false,
            (Some(MappingValue::Scalar(source)), true) => Some(MappingValue::Array(ArrayMapping {
                source: source.clone(),
                item_fields: BTreeMap::new(),
            })),
            (None, true) | (Some(_), true) => Some(MappingValue::Array(ArrayMapping::default())),
            (Some(MappingValue::Array(array)), false) => {
                non_blank(&array.source).map(|s| MappingValue::Scalar(s.to_string()))
            }
            (Some(MappingValue::Scalar(_)), false) | (Some(MappingValue::Object(_)), false) => return false,
        };
        let chain: Vec<String> = chain.iter().map(|f| f.name.clone()).collect();
        apply_at(&mut self.mapping, &chain, new_value)
    }

    /// Map one item field of an array node in per-field mode. An empty
    /// source field removes the entry.
    pub fn set_item_field(&mut self, path: &str, child_name: &str, source_field: &str) -> bool {
        let Some(chain) = field_chain(&self.fields, path) else {
            return false;
        };
        let Some(MappingValue::Array(array)) = self.value(path) else {
            return false;
        };
        let mut array = array.clone();
        let changed = match non_blank(source_field) {
            Some(v) => array.item_fields.insert(child_name.to_string(), v.to_string()).as_deref() != Some(v),
            None => array.item_fields.remove(child_name).is_some(),
        };
        if !changed {
            return false;
        }
        let new_value = if array.source.trim().is_empty() && array.item_fields.is_empty() {
            None
        } else {
            Some(MappingValue::Array(array))
        };
        let chain: Vec<String> = chain.iter().map(|f| f.name.clone()).collect();
        apply_at(&mut self.mapping, &chain, new_value)
    }

    /// The node's input mode: an explicit user toggle wins; otherwise the
    /// mode is derived from the current value (unset values browse).
    pub fn input_mode(&self, path: &str) -> InputMode {
        if let Some(mode) = self.nodes.get(path).and_then(|n| n.explicit_mode) {
            return mode;
        }
        let scalar = match self.value(path) {
            Some(MappingValue::Scalar(s)) => Some(s.as_str()),
            Some(MappingValue::Array(array)) => Some(array.source.as_str()),
            _ => None,
        };
        InputMode::derive(scalar)
    }

    pub fn set_input_mode(&mut self, path: &str, mode: InputMode) {
        self.nodes.entry(path.to_string()).or_default().explicit_mode = Some(mode);
    }

    /// Whether the section at `path` is expanded. Object/array nodes with
    /// unmapped required descendants auto-expand; a manual toggle wins until
    /// the next wholesale replacement.
    pub fn expanded(&self, path: &str) -> bool {
        if let Some(expanded) = self.nodes.get(path).and_then(|n| n.explicit_expanded) {
            return expanded;
        }
        let stats = self.node_completeness(path);
        stats.total > 0 && !stats.is_complete()
    }

    pub fn toggle_expanded(&mut self, path: &str) {
        let current = self.expanded(path);
        self.nodes.entry(path.to_string()).or_default().explicit_expanded = Some(!current);
    }

    /// Completeness badge for a single node
    pub fn node_completeness(&self, path: &str) -> CompletenessStats {
        match field_chain(&self.fields, path) {
            Some(chain) => match chain.last().copied() {
                Some(field) => completeness::node_stats(field, self.value(path)),
                None => CompletenessStats::default(),
            },
            None => CompletenessStats::default(),
        }
    }

    /// Overall completeness of the mapping against the current schema
    pub fn completeness(&self) -> CompletenessStats {
        completeness::count_required_mapped(&self.fields, &self.mapping)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Chain of fields from a root field down to the node at `path`
fn field_chain<'a>(fields: &'a [TemplateField], path: &str) -> Option<Vec<&'a TemplateField>> {
    for field in fields {
        if field.path == path {
            return Some(vec![field]);
        }
        if let Some(mut chain) = field_chain(&field.children, path) {
            chain.insert(0, field);
            return Some(chain);
        }
    }
    None
}

/// Apply a new value (or removal) at the end of a name chain, creating
/// intermediate objects on the way down and pruning emptied objects on the
/// way back up. Returns true when anything changed.
fn apply_at(map: &mut BTreeMap<String, MappingValue>, chain: &[String], new_value: Option<MappingValue>) -> bool {
    let name = &chain[0];
    if chain.len() == 1 {
        return match new_value {
            Some(value) => {
                if map.get(name) == Some(&value) {
                    false
                } else {
                    map.insert(name.clone(), value);
                    true
                }
            }
            None => map.remove(name).is_some(),
        };
    }
    // Removals only descend through mapped objects; a branch that was never
    // mapped (or holds a scalar) has nothing to remove
    if new_value.is_none() && !matches!(map.get(name), Some(MappingValue::Object(_))) {
        return false;
    }
    let entry = map
        .entry(name.clone())
        .or_insert_with(|| MappingValue::Object(BTreeMap::new()));
    if !matches!(entry, MappingValue::Object(_)) {
        *entry = MappingValue::Object(BTreeMap::new());
    }
    let changed = match entry {
        MappingValue::Object(children) => apply_at(children, &chain[1..], new_value),
        _ => false,
    };
    if let Some(MappingValue::Object(children)) = map.get(name) {
        if children.is_empty() {
            map.remove(name);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<TemplateField> {
        vec![
            TemplateField::scalar("customerName", true),
            TemplateField::with_children(
                "invoice",
                FieldKind::Object,
                false,
                vec![
                    TemplateField::scalar("invoice.date", true),
                    TemplateField::scalar("invoice.reference", false),
                ],
            ),
            TemplateField::with_children(
                "items",
                FieldKind::Array,
                true,
                vec![TemplateField::scalar("items.sku", true)],
            ),
        ]
    }

    fn editor() -> TreeEditor {
        let mut editor = TreeEditor::new();
        editor.set_template_fields(schema());
        editor
    }

    #[test]
    fn test_scalar_set_and_clear() {
        let mut editor = editor();
        assert!(editor.set_value("customerName", "doc:customer.name"));
        assert_eq!(
            editor.value("customerName"),
            Some(&MappingValue::Scalar("doc:customer.name".to_string()))
        );
        assert!(editor.set_value("customerName", ""));
        assert_eq!(editor.value("customerName"), None);
    }

    #[test]
    fn test_set_value_is_idempotent() {
        let mut editor = editor();
        assert!(editor.set_value("customerName", "doc:customer.name"));
        assert!(!editor.set_value("customerName", "doc:customer.name"));
        let stats = editor.completeness();
        assert_eq!(stats, CompletenessStats { mapped: 1, total: 2 });
    }

    #[test]
    fn test_nested_edit_creates_and_prunes_objects() {
        let mut editor = editor();
        assert!(editor.set_value("invoice.date", "doc:invoice.date"));
        assert_eq!(
            editor.mapping_json(),
            json!({"invoice": {"date": "doc:invoice.date"}})
        );
        // Clearing the last child removes the whole node, not `{}`
        assert!(editor.set_value("invoice.date", ""));
        assert_eq!(editor.mapping_json(), json!({}));
    }

    #[test]
    fn test_clearing_unmapped_branch_changes_nothing() {
        let mut editor = editor();
        assert!(!editor.set_value("invoice.date", ""));
        assert_eq!(editor.mapping_json(), json!({}));
    }

    #[test]
    fn test_array_direct_mode() {
        let mut editor = editor();
        assert!(editor.set_value("items", "pv:lines"));
        assert!(!editor.per_field_mode("items"));
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 1, total: 2 });
    }

    #[test]
    fn test_array_per_field_toggle_wraps_source() {
        let mut editor = editor();
        editor.set_value("items", "pv:lines");
        assert!(editor.set_per_field_mode("items", true));
        assert!(editor.per_field_mode("items"));
        assert_eq!(editor.mapping_json(), json!({"items": {"_source": "pv:lines"}}));
        assert!(editor.set_item_field("items", "sku", "code"));
        assert_eq!(
            editor.mapping_json(),
            json!({"items": {"_source": "pv:lines", "sku": "code"}})
        );
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 2, total: 2 });
    }

    #[test]
    fn test_array_toggle_off_discards_item_fields() {
        let mut editor = editor();
        editor.load_prefill(&json!({"items": {"_source": "pv:lines", "sku": "code"}}));
        assert!(editor.set_per_field_mode("items", false));
        assert_eq!(editor.mapping_json(), json!({"items": "pv:lines"}));
    }

    #[test]
    fn test_input_mode_derivation() {
        let mut editor = editor();
        assert_eq!(editor.input_mode("customerName"), InputMode::Browse);
        editor.set_value("customerName", "pv:name");
        assert_eq!(editor.input_mode("customerName"), InputMode::ProcessVariable);
        editor.set_value("customerName", "literal value");
        assert_eq!(editor.input_mode("customerName"), InputMode::Expression);
    }

    #[test]
    fn test_explicit_mode_survives_value_edits_but_not_prefill() {
        let mut editor = editor();
        editor.set_input_mode("customerName", InputMode::Expression);
        editor.set_value("customerName", "doc:customer.name");
        assert_eq!(editor.input_mode("customerName"), InputMode::Expression);
        // A wholesale prefill replacement supersedes the user toggle
        editor.load_prefill(&json!({"customerName": "doc:customer.name"}));
        assert_eq!(editor.input_mode("customerName"), InputMode::Browse);
    }

    #[test]
    fn test_auto_expand_with_unmapped_required_descendants() {
        let mut editor = editor();
        assert!(editor.expanded("invoice"));
        editor.set_value("invoice.date", "doc:invoice.date");
        assert!(!editor.expanded("invoice"));
    }

    #[test]
    fn test_manual_collapse_wins_over_auto_expand() {
        let mut editor = editor();
        assert!(editor.expanded("invoice"));
        editor.toggle_expanded("invoice");
        assert!(!editor.expanded("invoice"));
    }

    #[test]
    fn test_prefill_then_schema_order_is_tolerated() {
        let mut editor = TreeEditor::new();
        editor.load_prefill(&json!({"customerName": "doc:customer.name"}));
        assert_eq!(editor.completeness(), CompletenessStats::default());
        editor.set_template_fields(schema());
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 1, total: 2 });
    }
}
