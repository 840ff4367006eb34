//! Flat mapping editor
//!
//! Maintains the ordered row list backing a table-style mapping UI: one row
//! per mapped template field, each with a source kind and a raw expression
//! value. The editor owns no rendering; mutating calls report whether the
//! emitted mapping should be republished to the host.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use scribe_core::schema::collect_required_paths;
use scribe_core::template::TemplateField;

use crate::completeness::{count_required_mapped_flat, CompletenessStats};
use crate::expression::{classify, SourceKind};

/// One editable mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    /// Stable identity; monotonically increasing, never reused
    pub id: u64,
    /// Template field path, empty until the user selects one
    pub template_field: String,
    pub source_kind: SourceKind,
    /// Full expression value (e.g. "doc:customer.name", "pv:invoiceId", or a literal)
    pub value: String,
    /// A freshly added row swallows exactly one default-value notification
    /// from its input widgets before reacting to edits.
    pending_first_edit: bool,
}

impl MappingRow {
    fn new(id: u64) -> Self {
        MappingRow {
            id,
            template_field: String::new(),
            source_kind: SourceKind::Document,
            value: String::new(),
            pending_first_edit: true,
        }
    }
}

/// Table-style editor over the flat path-to-expression mapping
#[derive(Debug, Default)]
pub struct RowEditor {
    fields: Vec<TemplateField>,
    rows: Vec<MappingRow>,
    next_id: u64,
}

impl RowEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    /// Replace the template schema wholesale (last write wins) and add an
    /// empty row for every required path not yet covered by an existing row.
    pub fn set_template_fields(&mut self, fields: Vec<TemplateField>) {
        self.fields = fields;
        let covered: BTreeSet<&str> = self.rows.iter().map(|r| r.template_field.as_str()).collect();
        let mut to_add = Vec::new();
        for path in collect_required_paths(&self.fields) {
            if !covered.contains(path.as_str()) {
                to_add.push(path);
            }
        }
        for path in to_add {
            let mut row = MappingRow::new(self.next_id());
            // Auto-populated rows carry a real selection, so they react to
            // the first edit like any other row.
            row.template_field = path;
            row.pending_first_edit = false;
            self.rows.push(row);
        }
    }

    /// Replace all rows from an external flat mapping payload.
    ///
    /// The source kind of each row is classified from the stored string.
    /// A non-object payload coerces to an empty row list; non-string values
    /// are stringified.
    pub fn load_prefill(&mut self, prefill: &Value) {
        self.rows.clear();
        let Value::Object(entries) = prefill else {
            return;
        };
        for (path, value) in entries {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => String::new(),
            };
            let mut row = MappingRow::new(self.next_id());
            row.template_field = path.clone();
            row.source_kind = match classify(&value) {
                SourceKind::Empty => SourceKind::Document,
                kind => kind,
            };
            row.value = value;
            row.pending_first_edit = false;
            self.rows.push(row);
        }
    }

    /// Append an empty row; returns its id. The new row does not touch the
    /// emitted mapping until it has both a field selection and a value.
    pub fn add_row(&mut self) -> u64 {
        let id = self.next_id();
        self.rows.push(MappingRow::new(id));
        id
    }

    /// Delete a row. Returns true when a re-emit is due.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    /// Change a row's template field selection. Returns true when a re-emit
    /// is due; an unchanged selection is a no-op.
    pub fn update_field(&mut self, index: usize, path: &str) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        if row.pending_first_edit {
            row.pending_first_edit = false;
            if path.is_empty() {
                return false;
            }
        }
        if row.template_field == path {
            return false;
        }
        row.template_field = path.to_string();
        true
    }

    /// Change a row's source kind. Clears the row value, since the value's
    /// interpretation depends on the kind.
    pub fn update_source_kind(&mut self, index: usize, kind: SourceKind) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        if row.pending_first_edit {
            row.pending_first_edit = false;
            if kind == SourceKind::Document {
                return false;
            }
        }
        if row.source_kind == kind {
            return false;
        }
        row.source_kind = kind;
        row.value.clear();
        true
    }

    /// Change a row's expression value. An unchanged value is a no-op.
    pub fn update_value(&mut self, index: usize, value: &str) -> bool {
        let Some(row) = self.rows.get_mut(index) else {
            return false;
        };
        if row.pending_first_edit {
            row.pending_first_edit = false;
            if value.is_empty() {
                return false;
            }
        }
        if row.value == value {
            return false;
        }
        row.value = value.to_string();
        true
    }

    /// The emitted flat mapping: rows with an empty field or value are dropped.
    pub fn mapping(&self) -> BTreeMap<String, String> {
        self.rows
            .iter()
            .filter(|r| !r.template_field.is_empty() && !r.value.is_empty())
            .map(|r| (r.template_field.clone(), r.value.clone()))
            .collect()
    }

    pub fn completeness(&self) -> CompletenessStats {
        count_required_mapped_flat(&self.fields, &self.mapping())
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Vec<TemplateField> {
        vec![
            TemplateField::scalar("customerName", true),
            TemplateField::scalar("amount", true),
            TemplateField::scalar("notes", false),
        ]
    }

    #[test]
    fn test_required_rows_auto_populated() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        let paths: Vec<&str> = editor.rows().iter().map(|r| r.template_field.as_str()).collect();
        assert_eq!(paths, vec!["customerName", "amount"]);
        // Auto-populated rows have no value yet, so nothing is emitted
        assert!(editor.mapping().is_empty());
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 0, total: 2 });
    }

    #[test]
    fn test_row_ids_are_never_reused() {
        let mut editor = RowEditor::new();
        let first = editor.add_row();
        editor.remove_row(0);
        let second = editor.add_row();
        assert!(second > first);
    }

    #[test]
    fn test_new_row_swallows_one_default_notification() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        editor.add_row();
        // The widget fires an initial "no selection" event on creation
        assert!(!editor.update_field(2, ""));
        // The next empty selection is a real no-op, not a suppression
        assert!(!editor.update_field(2, ""));
        assert!(editor.update_field(2, "notes"));
    }

    #[test]
    fn test_first_real_edit_is_accepted() {
        let mut editor = RowEditor::new();
        editor.add_row();
        assert!(editor.update_value(0, "pv:invoiceId"));
        assert_eq!(editor.rows()[0].value, "pv:invoiceId");
    }

    #[test]
    fn test_unchanged_edit_is_a_no_op() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        assert!(editor.update_value(0, "doc:customer.name"));
        assert!(!editor.update_value(0, "doc:customer.name"));
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 1, total: 2 });
    }

    #[test]
    fn test_kind_change_clears_value() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        editor.update_value(0, "doc:customer.name");
        assert!(editor.update_source_kind(0, SourceKind::ProcessVariable));
        assert_eq!(editor.rows()[0].value, "");
        assert!(!editor.mapping().contains_key("customerName"));
    }

    #[test]
    fn test_prefill_classifies_source_kinds() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        editor.load_prefill(&json!({
            "customerName": "doc:customer.name",
            "amount": "pv:total",
            "notes": "fixed text"
        }));
        // Prefill entries arrive keyed by path, so rows come back in path order
        let kinds: Vec<(&str, SourceKind)> = editor
            .rows()
            .iter()
            .map(|r| (r.template_field.as_str(), r.source_kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("amount", SourceKind::ProcessVariable),
                ("customerName", SourceKind::Document),
                ("notes", SourceKind::Manual),
            ]
        );
        assert_eq!(editor.completeness(), CompletenessStats { mapped: 2, total: 2 });
    }

    #[test]
    fn test_malformed_prefill_coerces_to_empty() {
        let mut editor = RowEditor::new();
        editor.load_prefill(&json!("not an object"));
        assert!(editor.rows().is_empty());
        editor.load_prefill(&json!({"amount": 42}));
        assert_eq!(editor.rows()[0].value, "42");
    }

    #[test]
    fn test_emitted_mapping_drops_incomplete_rows() {
        let mut editor = RowEditor::new();
        editor.set_template_fields(schema());
        editor.update_value(0, "doc:customer.name");
        editor.add_row();
        editor.update_value(2, "orphan value");
        let mapping = editor.mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("customerName").map(String::as_str), Some("doc:customer.name"));
    }
}
