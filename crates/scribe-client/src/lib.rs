//! Scribe Client: thin HTTP client over the Scribe document-generation API
//!
//! Owns no mapping logic. Lists templates, variants, and environments,
//! submits generation requests, polls job status, downloads documents, and
//! syncs template definitions from disk.

pub mod client;
pub mod connection;
pub mod deploy;

pub use client::{
    GenerateRequest, ImportResult, ImportTemplatesRequest, ImportTemplatesResponse, ScribeClient,
    VariantSelectionAttribute,
};
pub use connection::Connection;
pub use deploy::{scan_template_definitions, TemplateDefinition, TemplateSyncService};
