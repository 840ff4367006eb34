//! HTTP client for the Scribe API
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use scribe_core::job::{FileFormat, GeneratedDocument, GenerationJobDetail};
use scribe_core::template::{EnvironmentInfo, TemplateDetails, TemplateInfo, VariantInfo};
use scribe_core::ScribeError;

use crate::connection::Connection;

const API_KEY_HEADER: &str = "X-Api-Key";

/// One attribute of attribute-based variant selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelectionAttribute {
    pub key: String,
    pub value: String,
}

/// Body of a document generation request.
///
/// Variant selection modes are mutually exclusive: leave both `variant_id`
/// and `variant_attributes` unset to use the template's default variant, set
/// `variant_id` for an explicit variant, or set `variant_attributes` to let
/// the API pick the matching one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_attributes: Option<Vec<VariantSelectionAttribute>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    /// Nested template data with all source expressions already resolved
    pub data: Value,
    pub format: FileFormat,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

/// Bulk template import request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTemplatesRequest {
    pub templates: Vec<crate::deploy::TemplateDefinition>,
}

/// Per-template outcome of a bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportTemplatesResponse {
    #[serde(default)]
    pub results: Vec<ImportResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub slug: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Client for one tenant of the Scribe API
#[derive(Debug, Clone)]
pub struct ScribeClient {
    http: reqwest::Client,
    connection: Connection,
}

impl ScribeClient {
    pub fn new(connection: Connection) -> Self {
        ScribeClient {
            http: reqwest::Client::new(),
            connection,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// All templates available to the tenant
    pub async fn get_templates(&self) -> Result<Vec<TemplateInfo>, ScribeError> {
        self.get_json(self.connection.tenant_url("templates")).await
    }

    /// Template details including the mappable field tree
    pub async fn get_template_details(&self, template_id: &str) -> Result<TemplateDetails, ScribeError> {
        self.get_json(self.connection.tenant_url(&format!("templates/{}", template_id)))
            .await
    }

    /// All publishing environments of the tenant
    pub async fn get_environments(&self) -> Result<Vec<EnvironmentInfo>, ScribeError> {
        self.get_json(self.connection.tenant_url("environments")).await
    }

    /// All variants of a template
    pub async fn get_variants(&self, template_id: &str) -> Result<Vec<VariantInfo>, ScribeError> {
        self.get_json(
            self.connection
                .tenant_url(&format!("templates/{}/variants", template_id)),
        )
        .await
    }

    /// Submit a generation request. Generation is asynchronous: the returned
    /// request id is what job-status polling and callbacks refer to.
    pub async fn generate_document(&self, request: &GenerateRequest) -> Result<GeneratedDocument, ScribeError> {
        tracing::info!(
            template_id = %request.template_id,
            variant_id = ?request.variant_id,
            filename = %request.filename,
            "submitting document generation request"
        );
        let response = self
            .http
            .post(self.connection.tenant_url("generations"))
            .header(API_KEY_HEADER, self.connection.api_key())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let document: GeneratedDocument = decode(check(response).await?).await?;
        tracing::info!(request_id = %document.request_id, "generation request accepted");
        Ok(document)
    }

    /// Current status of a generation job
    pub async fn get_job_status(&self, request_id: &str) -> Result<GenerationJobDetail, ScribeError> {
        self.get_json(self.connection.tenant_url(&format!("generations/{}", request_id)))
            .await
    }

    /// Download the bytes of a completed document
    pub async fn download_document(&self, document_id: &str) -> Result<Vec<u8>, ScribeError> {
        let url = self
            .connection
            .tenant_url(&format!("documents/{}/content", document_id));
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.connection.api_key())
            .send()
            .await
            .map_err(transport)?;
        let response = check(response).await?;
        let bytes = response.bytes().await.map_err(transport)?;
        tracing::debug!(document_id, len = bytes.len(), "document downloaded");
        Ok(bytes.to_vec())
    }

    /// Bulk-import template definitions, creating or updating templates and
    /// their variants.
    pub async fn import_templates(
        &self,
        request: &ImportTemplatesRequest,
    ) -> Result<ImportTemplatesResponse, ScribeError> {
        let response = self
            .http
            .post(self.connection.tenant_url("templates/import"))
            .header(API_KEY_HEADER, self.connection.api_key())
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(check(response).await?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ScribeError> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, self.connection.api_key())
            .send()
            .await
            .map_err(transport)?;
        decode(check(response).await?).await
    }
}

fn transport(err: reqwest::Error) -> ScribeError {
    ScribeError::Transport(err.to_string())
}

/// Turn non-success answers into API errors carrying the response body
async fn check(response: Response) -> Result<Response, ScribeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        message
    };
    Err(ScribeError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ScribeError> {
    response
        .json()
        .await
        .map_err(|e| ScribeError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_request_wire_shape() {
        let request = GenerateRequest {
            template_id: "invoice".to_string(),
            variant_id: None,
            variant_attributes: Some(vec![VariantSelectionAttribute {
                key: "language".to_string(),
                value: "nl".to_string(),
            }]),
            environment_id: Some("production".to_string()),
            data: json!({"customerName": "John"}),
            format: FileFormat::Pdf,
            filename: "invoice.pdf".to_string(),
            correlation_id: None,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({
                "templateId": "invoice",
                "variantAttributes": [{"key": "language", "value": "nl"}],
                "environmentId": "production",
                "data": {"customerName": "John"},
                "format": "PDF",
                "filename": "invoice.pdf"
            })
        );
    }

    #[test]
    fn test_import_response_tolerates_missing_results() {
        let response: ImportTemplatesResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
