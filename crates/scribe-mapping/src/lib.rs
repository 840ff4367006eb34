//! Scribe Mapping: data-mapping resolution and tree editing
//!
//! The core of the plugin: classify data-source expressions, edit the
//! mapping from template field paths to expressions in either the flat or
//! the nested shape, convert between the two, and track completeness of
//! required fields under incremental edits.

pub mod completeness;
pub mod convert;
pub mod expression;
pub mod rows;
pub mod tree;
pub mod validate;
pub mod value;

pub use completeness::{count_required_mapped, count_required_mapped_flat, CompletenessStats};
pub use expression::{classify, extract_path, extract_prefix, is_resolvable, SourceKind};
pub use rows::{MappingRow, RowEditor};
pub use tree::{InputMode, TreeEditor};
pub use validate::{find_missing_required_fields, find_missing_required_fields_nested, ValidationResult};
pub use value::{nested_from_json, nested_to_json, ArrayMapping, MappingValue, ARRAY_SOURCE_KEY};
