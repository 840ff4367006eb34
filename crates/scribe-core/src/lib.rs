//! Scribe Core: domain model shared by every plugin crate
//!
//! Template schemas, generation job states, and the tree traversal
//! utilities that the mapping editors build on.

pub mod error;
pub mod job;
pub mod schema;
pub mod template;

pub use error::ScribeError;
pub use job::{FileFormat, GeneratedDocument, GenerationJobDetail, GenerationJobStatus};
pub use schema::{collect_required_paths, find_field, flatten_to_options, FieldOption};
pub use template::{EnvironmentInfo, FieldKind, TemplateDetails, TemplateField, TemplateInfo, VariantInfo};

/// Plugin key under which the host registers this integration
pub const PLUGIN_KEY: &str = "scribe";
