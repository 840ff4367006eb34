//! Workflow actions
//!
//! The three actions the host can bind to workflow steps: submit a
//! generation request, poll its status, and download the finished document.
//! The host's engine and its value resolver are reached through the
//! `WorkflowExecution` and `ValueResolver` seams.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

use scribe_client::{Connection, GenerateRequest, ScribeClient, VariantSelectionAttribute};
use scribe_core::job::{GeneratedDocument, GenerationJobDetail};
use scribe_core::ScribeError;
use scribe_mapping::is_resolvable;

use crate::config::{CheckJobStatusConfig, DownloadDocumentConfig, GenerateDocumentConfig};
use crate::properties::PluginProperties;
use crate::resolve::{apply_resolved_values, collect_resolvable_values};

/// Well-known variable carrying the request id of the latest submission.
/// Set both locally and on the process instance: local variables support
/// parallel branches with their own scope, the instance variable is the
/// fallback for steps running on a different execution.
pub const REQUEST_ID_VARIABLE: &str = "scribeRequestId";
/// Well-known variable carrying the tenant of the latest submission
pub const TENANT_ID_VARIABLE: &str = "scribeTenantId";

/// The workflow engine execution a plugin action runs against
pub trait WorkflowExecution {
    fn process_instance_id(&self) -> &str;
    fn get_variable(&self, name: &str) -> Option<Value>;
    fn set_variable(&mut self, name: &str, value: Value);
    fn set_local_variable(&mut self, name: &str, value: Value);
}

/// The host's value resolver: turns `doc:`/`case:`/`pv:` expressions into
/// concrete values for one execution, in a single batch.
pub trait ValueResolver {
    fn resolve_values(&self, execution: &dyn WorkflowExecution, expressions: &[String]) -> BTreeMap<String, Value>;
}

/// One configured plugin instance bound to a Scribe tenant
pub struct ScribePlugin {
    properties: PluginProperties,
    client: ScribeClient,
}

impl ScribePlugin {
    pub fn new(properties: PluginProperties) -> Result<Self, ScribeError> {
        properties.validate()?;
        let connection = Connection::new(&properties.base_url, &properties.api_key, &properties.tenant_id)?;
        Ok(ScribePlugin {
            properties,
            client: ScribeClient::new(connection),
        })
    }

    pub fn properties(&self) -> &PluginProperties {
        &self.properties
    }

    pub fn client(&self) -> &ScribeClient {
        &self.client
    }

    /// Submit a document generation request.
    ///
    /// Resolves every source expression in the configured mapping (and in
    /// the filename and variant attributes), submits the request, and stores
    /// the request id in the configured process variable.
    pub async fn generate_document(
        &self,
        execution: &mut dyn WorkflowExecution,
        resolver: &dyn ValueResolver,
        config: &GenerateDocumentConfig,
    ) -> Result<GeneratedDocument, ScribeError> {
        tracing::info!(
            template_id = %config.template_id,
            variant_id = ?config.variant_id,
            filename = %config.filename,
            "starting document generation"
        );

        let has_variant_id = config.variant_id.as_deref().is_some_and(|v| !v.trim().is_empty());
        let has_attributes = config.variant_attributes.as_ref().is_some_and(|a| !a.is_empty());
        if has_variant_id && has_attributes {
            return Err(ScribeError::action(
                "cannot specify both variantId and variantAttributes",
            ));
        }

        let data = resolve_data_mapping(resolver, execution, &config.data_mapping);
        let filename = resolve_single(resolver, execution, &config.filename);
        let variant_attributes = if has_attributes {
            config
                .variant_attributes
                .as_ref()
                .map(|attributes| resolve_variant_attributes(resolver, execution, attributes))
        } else {
            None
        };

        let request = GenerateRequest {
            template_id: config.template_id.clone(),
            variant_id: if has_variant_id { config.variant_id.clone() } else { None },
            variant_attributes,
            environment_id: effective_environment(config.environment_id.as_deref(), &self.properties),
            data: Value::Object(data),
            format: config.output_format,
            filename,
            correlation_id: config.correlation_id.clone(),
        };

        let document = self.client.generate_document(&request).await?;

        let request_id = Value::String(document.request_id.clone());
        let tenant_id = Value::String(self.properties.tenant_id.clone());
        execution.set_variable(&config.result_process_variable, request_id.clone());
        execution.set_local_variable(REQUEST_ID_VARIABLE, request_id.clone());
        execution.set_variable(REQUEST_ID_VARIABLE, request_id);
        execution.set_local_variable(TENANT_ID_VARIABLE, tenant_id.clone());
        execution.set_variable(TENANT_ID_VARIABLE, tenant_id);

        tracing::info!(
            variable = %config.result_process_variable,
            request_id = %document.request_id,
            "generation request submitted"
        );
        Ok(document)
    }

    /// Poll the status of a generation job and store the outcome in the
    /// configured process variables.
    pub async fn check_job_status(
        &self,
        execution: &mut dyn WorkflowExecution,
        config: &CheckJobStatusConfig,
    ) -> Result<GenerationJobDetail, ScribeError> {
        let request_id = string_variable(execution, &config.request_id_variable)?;
        tracing::info!(%request_id, "checking job status");

        let detail = self.client.get_job_status(&request_id).await?;

        execution.set_variable(&config.status_variable, Value::String(detail.status.as_str().to_string()));
        if let (Some(document_id), Some(variable)) = (
            detail.document_id.as_deref(),
            non_blank(config.document_id_variable.as_deref()),
        ) {
            execution.set_variable(variable, Value::String(document_id.to_string()));
        }
        if let (Some(message), Some(variable)) = (
            detail.error_message.as_deref(),
            non_blank(config.error_message_variable.as_deref()),
        ) {
            execution.set_variable(variable, Value::String(message.to_string()));
        }

        tracing::info!(
            %request_id,
            status = detail.status.as_str(),
            document_id = ?detail.document_id,
            "job status stored"
        );
        Ok(detail)
    }

    /// Download a completed document and store its content, base64 encoded,
    /// in the configured process variable.
    pub async fn download_document(
        &self,
        execution: &mut dyn WorkflowExecution,
        config: &DownloadDocumentConfig,
    ) -> Result<(), ScribeError> {
        let document_id = string_variable(execution, &config.document_id_variable)?;
        tracing::info!(%document_id, "downloading document");

        let content = self.client.download_document(&document_id).await?;
        execution.set_variable(&config.content_variable, Value::String(BASE64.encode(&content)));

        tracing::info!(%document_id, len = content.len(), "document stored");
        Ok(())
    }
}

/// Resolve every expression in the configured nested mapping in one batch
fn resolve_data_mapping(
    resolver: &dyn ValueResolver,
    execution: &dyn WorkflowExecution,
    mapping: &Value,
) -> Map<String, Value> {
    let empty = Map::new();
    let mapping = mapping.as_object().unwrap_or(&empty);
    let mut expressions = Vec::new();
    collect_resolvable_values(mapping, &mut expressions);
    let resolved = if expressions.is_empty() {
        BTreeMap::new()
    } else {
        resolver.resolve_values(execution, &expressions)
    };
    apply_resolved_values(mapping, &resolved)
}

/// Resolve a single value if it carries a resolver prefix
fn resolve_single(resolver: &dyn ValueResolver, execution: &dyn WorkflowExecution, value: &str) -> String {
    if !is_resolvable(value) {
        return value.to_string();
    }
    let resolved = resolver.resolve_values(execution, &[value.to_string()]);
    match resolved.get(value) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => value.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Resolve variant attribute values that carry resolver prefixes
fn resolve_variant_attributes(
    resolver: &dyn ValueResolver,
    execution: &dyn WorkflowExecution,
    attributes: &BTreeMap<String, String>,
) -> Vec<VariantSelectionAttribute> {
    let expressions: Vec<String> = attributes
        .values()
        .filter(|v| is_resolvable(v))
        .cloned()
        .collect();
    let resolved = if expressions.is_empty() {
        BTreeMap::new()
    } else {
        resolver.resolve_values(execution, &expressions)
    };
    attributes
        .iter()
        .map(|(key, raw)| {
            let value = match resolved.get(raw) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => raw.clone(),
                Some(other) => other.to_string(),
            };
            VariantSelectionAttribute {
                key: key.clone(),
                value,
            }
        })
        .collect()
}

/// Action-level environment wins; the plugin default is the fallback
fn effective_environment(environment_id: Option<&str>, properties: &PluginProperties) -> Option<String> {
    match non_blank(environment_id) {
        Some(id) => Some(id.to_string()),
        None => non_blank(properties.default_environment_id.as_deref()).map(str::to_string),
    }
}

fn string_variable(execution: &dyn WorkflowExecution, name: &str) -> Result<String, ScribeError> {
    match execution.get_variable(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => Err(ScribeError::action(format!("variable '{}' is null or empty", name))),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
