//! Template schema model: the field tree a document template exposes for mapping
use serde::{Deserialize, Serialize};

/// Shape of a single template field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Scalar,
    Object,
    Array,
}

/// One fillable slot in a document template.
///
/// Fields form a tree: `Object` fields nest independently mappable children,
/// `Array` fields carry children describing the shape of one collection item.
/// `path` is the fully qualified dotted path from the template root and is
/// unique across the tree; a child's path is a strict extension of its
/// parent's path. A `Scalar` field never has children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    /// Leaf label, the last path segment
    pub name: String,
    /// Fully qualified dotted path, unique across the tree
    pub path: String,
    /// Data type label from the template (e.g. "string", "number", "date")
    #[serde(rename = "type", default = "default_type_label")]
    pub type_label: String,
    pub field_type: FieldKind,
    /// For `Object` fields this applies to required descendant leaves,
    /// not the object node itself.
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateField>,
}

fn default_type_label() -> String {
    "string".to_string()
}

impl TemplateField {
    /// Scalar leaf with the name doubling as the path (top-level field)
    pub fn scalar(path: &str, required: bool) -> Self {
        Self::leaf(path, FieldKind::Scalar, required)
    }

    pub fn leaf(path: &str, field_type: FieldKind, required: bool) -> Self {
        TemplateField {
            name: path.rsplit('.').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            type_label: default_type_label(),
            field_type,
            required,
            description: None,
            children: Vec::new(),
        }
    }

    pub fn with_children(path: &str, field_type: FieldKind, required: bool, children: Vec<TemplateField>) -> Self {
        TemplateField {
            children,
            ..Self::leaf(path, field_type, required)
        }
    }
}

/// Basic information about a template, as listed by the Scribe API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Template details including its mappable field tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

/// A publishing environment of the tenant (e.g. "production", "staging")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub id: String,
    pub name: String,
}

/// A variant of a template (e.g. a language or brand rendition)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    pub id: String,
    pub template_id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
