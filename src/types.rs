//! Core document and execution types
//!
//! All types use snake_case JSON, matching the attribute names of the
//! documents table and the workflow input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of a document: `(workspace_id, document_id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub workspace_id: String,
    pub document_id: String,
}

impl DocumentKey {
    pub fn new(workspace_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            document_id: document_id.into(),
        }
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.workspace_id, self.document_id)
    }
}

/// Ingestion status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// A workflow execution has started for the document
    Processing,
    /// The batch job finished successfully
    Processed,
    /// The batch job failed
    Error,
}

impl DocumentStatus {
    /// Whether no further transition is expected from this status
    pub fn is_terminal(self) -> bool {
        !matches!(self, DocumentStatus::Processing)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Processed => write!(f, "processed"),
            DocumentStatus::Error => write!(f, "error"),
        }
    }
}

/// A document record as held by a [`DocumentStore`](crate::store::DocumentStore)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub key: DocumentKey,

    pub status: DocumentStatus,

    /// Last status change
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Succeeded => write!(f, "succeeded"),
            ExecutionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Record of a single workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    /// Execution ID (exec-<uuid>)
    pub id: String,

    /// Workflow name, e.g. `file-import`
    pub workflow: String,

    #[serde(flatten)]
    pub key: DocumentKey,

    pub status: ExecutionStatus,

    pub started_at: DateTime<Utc>,

    pub ended_at: DateTime<Utc>,

    pub duration_ms: u64,

    /// Final state output on success: the input plus `job`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// Error (`error`) and cause (`cause`) on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,

    /// State names in the order they were entered
    pub states: Vec<String>,
}

impl Execution {
    pub fn succeeded(&self) -> bool {
        self.status == ExecutionStatus::Succeeded
    }
}
