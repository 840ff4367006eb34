//! Template definition scanning and synchronization
//!
//! Template definitions live next to the application's configuration, one
//! directory per template with a `definition.json` or `definition.yaml`
//! inside. On startup (when the plugin enables sync) they are pushed to
//! Scribe through the bulk import endpoint.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scribe_core::ScribeError;

use crate::client::{ImportTemplatesRequest, ImportTemplatesResponse, ScribeClient};

/// A template definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub slug: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub data_model: Value,
    #[serde(default)]
    pub template_model: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantDefinition>,
    /// Environments the imported version is published to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub publish_to: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub template_model: Value,
}

/// Scan a definitions directory for template definition files.
///
/// Unreadable or incomplete files are skipped with a warning; a missing
/// directory yields an empty list. Definitions without a slug or version are
/// not importable and are skipped as well.
pub fn scan_template_definitions(dir: &Path) -> Vec<TemplateDefinition> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to scan for template definitions");
            return Vec::new();
        }
    };

    let mut definitions = Vec::new();
    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let Some(definition) = read_definition(&entry.path()) else {
            continue;
        };
        if definition.slug.trim().is_empty() {
            tracing::warn!(path = %entry.path().display(), "skipping template definition without slug");
            continue;
        }
        if definition.version.trim().is_empty() {
            tracing::warn!(
                path = %entry.path().display(),
                slug = %definition.slug,
                "skipping template definition without version"
            );
            continue;
        }
        definitions.push(definition);
    }
    definitions.sort_by(|a, b| a.slug.cmp(&b.slug));
    definitions
}

fn read_definition(dir: &Path) -> Option<TemplateDefinition> {
    let json_path = dir.join("definition.json");
    if json_path.is_file() {
        return match std::fs::read_to_string(&json_path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(definition) => Some(definition),
            Err(e) => {
                tracing::warn!(path = %json_path.display(), error = %e, "unreadable template definition");
                None
            }
        };
    }
    let yaml_path = dir.join("definition.yaml");
    if yaml_path.is_file() {
        return match std::fs::read_to_string(&yaml_path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_yaml::from_str(&s).map_err(|e| e.to_string()))
        {
            Ok(definition) => Some(definition),
            Err(e) => {
                tracing::warn!(path = %yaml_path.display(), error = %e, "unreadable template definition");
                None
            }
        };
    }
    None
}

/// Pushes scanned template definitions to Scribe
pub struct TemplateSyncService {
    client: ScribeClient,
}

impl TemplateSyncService {
    pub fn new(client: ScribeClient) -> Self {
        TemplateSyncService { client }
    }

    /// Import the given definitions, logging the per-template outcome.
    /// An empty definition list skips the API call entirely.
    pub async fn sync(&self, definitions: Vec<TemplateDefinition>) -> Result<ImportTemplatesResponse, ScribeError> {
        if definitions.is_empty() {
            tracing::info!("no template definitions found, skipping sync");
            return Ok(ImportTemplatesResponse { results: Vec::new() });
        }
        tracing::info!(count = definitions.len(), "syncing template definitions");
        let response = self
            .client
            .import_templates(&ImportTemplatesRequest { templates: definitions })
            .await?;
        for result in &response.results {
            match result.message.as_deref() {
                Some(message) => tracing::info!(slug = %result.slug, action = %result.action, message, "template synced"),
                None => tracing::info!(slug = %result.slug, action = %result.action, "template synced"),
            }
        }
        Ok(response)
    }
}
