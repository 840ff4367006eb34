//! Persisted action configurations
//!
//! These are the shapes the host stores against a workflow step and hands
//! back on every configuration session (the prefill) and every execution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scribe_core::job::FileFormat;

/// Configuration of the generate-document action.
///
/// `variant_id` and `variant_attributes` are mutually exclusive; with
/// neither set the template's default variant is used. `data_mapping` is the
/// nested mapping as emitted by the tree editor; its values may carry value
/// resolver expressions (`doc:`, `case:`, `pv:`) resolved at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentConfig {
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_attributes: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub data_mapping: Value,
    pub output_format: FileFormat,
    /// Filename for the generated document; may use value resolvers
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Process variable receiving the generation request id
    pub result_process_variable: String,
}

/// Configuration of the check-job-status action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckJobStatusConfig {
    /// Variable holding the request id to poll
    pub request_id_variable: String,
    /// Variable receiving the job status name
    pub status_variable: String,
    /// Variable receiving the document id once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id_variable: Option<String>,
    /// Variable receiving the error message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message_variable: Option<String>,
}

/// Configuration of the download-document action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDocumentConfig {
    /// Variable holding the document id to download
    pub document_id_variable: String,
    /// Variable receiving the document content, base64 encoded
    pub content_variable: String,
}
