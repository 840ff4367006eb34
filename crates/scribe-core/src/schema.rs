//! Tree traversal over template field schemas
//!
//! Shared by the mapping editors and the validator: flattening the tree into
//! selectable options and collecting the paths that must be mapped.

use crate::template::{FieldKind, TemplateField};

/// One selectable entry in a flat field picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub path: String,
    pub label: String,
}

/// Flatten the field tree into an ordered option list.
///
/// Descends into `Object` children, since object leaves are independently
/// mappable. Does NOT descend into `Array` children: array items are mapped
/// as a unit (or per item through the tree editor), never from the flat
/// option list. Labels carry a type annotation for non-scalars and a `*`
/// marker for required fields.
pub fn flatten_to_options(fields: &[TemplateField]) -> Vec<FieldOption> {
    let mut options = Vec::new();
    collect_options(fields, &mut options);
    options
}

fn collect_options(fields: &[TemplateField], options: &mut Vec<FieldOption>) {
    for field in fields {
        let type_label = match field.field_type {
            FieldKind::Scalar => "",
            FieldKind::Object => " [object]",
            FieldKind::Array => " [array]",
        };
        let required_marker = if field.required { " *" } else { "" };
        options.push(FieldOption {
            path: field.path.clone(),
            label: format!("{}{}{}", field.path, type_label, required_marker),
        });
        if !field.children.is_empty() && field.field_type != FieldKind::Array {
            collect_options(&field.children, options);
        }
    }
}

/// Collect the paths of all required `Scalar` and `Array` fields.
///
/// `Object` fields recurse into their children without emitting their own
/// path: an object is never required as a unit, only its descendants are.
pub fn collect_required_paths(fields: &[TemplateField]) -> Vec<String> {
    let mut paths = Vec::new();
    collect_required(fields, &mut paths);
    paths
}

fn collect_required(fields: &[TemplateField], paths: &mut Vec<String>) {
    for field in fields {
        match field.field_type {
            FieldKind::Scalar | FieldKind::Array => {
                if field.required {
                    paths.push(field.path.clone());
                }
            }
            FieldKind::Object => collect_required(&field.children, paths),
        }
    }
}

/// Look up a field anywhere in the tree by its unique path
pub fn find_field<'a>(fields: &'a [TemplateField], path: &str) -> Option<&'a TemplateField> {
    for field in fields {
        if field.path == path {
            return Some(field);
        }
        if let Some(found) = find_field(&field.children, path) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateField;

    fn invoice_schema() -> Vec<TemplateField> {
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
                "lines",
                FieldKind::Array,
                true,
                vec![TemplateField::scalar("lines.sku", true)],
            ),
        ]
    }

    #[test]
    fn test_flatten_descends_objects_not_arrays() {
        let options = flatten_to_options(&invoice_schema());
        let paths: Vec<&str> = options.iter().map(|o| o.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["customerName", "invoice", "invoice.date", "invoice.reference", "lines"]
        );
        assert!(!paths.contains(&"lines.sku"));
    }

    #[test]
    fn test_flatten_labels() {
        let options = flatten_to_options(&invoice_schema());
        assert_eq!(options[0].label, "customerName *");
        assert_eq!(options[1].label, "invoice [object]");
        assert_eq!(options[4].label, "lines [array] *");
    }

    #[test]
    fn test_required_paths_skip_object_nodes() {
        let paths = collect_required_paths(&invoice_schema());
        assert_eq!(paths, vec!["customerName", "invoice.date", "lines"]);
    }

    #[test]
    fn test_find_field_by_path() {
        let schema = invoice_schema();
        assert_eq!(find_field(&schema, "invoice.date").unwrap().name, "date");
        assert_eq!(find_field(&schema, "lines.sku").unwrap().name, "sku");
        assert!(find_field(&schema, "missing").is_none());
    }
}
