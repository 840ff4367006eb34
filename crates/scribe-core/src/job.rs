//! Generation job model: the states a document generation request moves through
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a document generation job in Scribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationJobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl GenerationJobStatus {
    /// Wire/process-variable name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Detailed information about a document generation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJobDetail {
    pub request_id: String,
    pub status: GenerationJobStatus,
    /// The generated document ID, available when status is `Completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Error message, available when status is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of submitting a generation request: the id to poll with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDocument {
    pub request_id: String,
}

/// Output format of a generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    Pdf,
    Html,
}

impl Default for FileFormat {
    fn default() -> Self {
        Self::Pdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let status: GenerationJobStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(status, GenerationJobStatus::InProgress);
        assert_eq!(status.as_str(), "IN_PROGRESS");
    }

    #[test]
    fn test_terminal_states() {
        assert!(GenerationJobStatus::Completed.is_terminal());
        assert!(GenerationJobStatus::Failed.is_terminal());
        assert!(!GenerationJobStatus::Pending.is_terminal());
        assert!(!GenerationJobStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_job_detail_ignores_missing_optionals() {
        let detail: GenerationJobDetail = serde_json::from_str(
            r#"{"requestId": "req-1", "status": "PENDING"}"#,
        )
        .unwrap();
        assert_eq!(detail.request_id, "req-1");
        assert!(detail.document_id.is_none());
        assert!(detail.completed_at.is_none());
    }
}
