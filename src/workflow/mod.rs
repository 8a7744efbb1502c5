//! Document ingestion workflows
//!
//! Both workflows share one shape:
//!
//! ```text
//! SetProcessing ──▶ <Job> ──▶ SetProcessed ──▶ Success
//!                     │
//!                     └─ any error ─▶ HandleError ──▶ Fail
//! ```
//!
//! `SetProcessing`, `SetProcessed` and `HandleError` write the document
//! status (`processing`, `processed`, `error`); the job state submits one
//! batch job and waits for it.

mod definition;
mod executor;

pub use definition::{
    BatchTarget, EnvBinding, JobDefinitionRef, JobQueueRef, TableRef, WorkflowDefinition,
    FAIL, HANDLE_ERROR, SET_PROCESSED, SET_PROCESSING, SUCCESS,
};
pub use executor::WorkflowExecutor;

use crate::error::{Error, Result};
use crate::types::DocumentKey;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The two ingestion workflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    /// Import an uploaded file
    FileImport,
    /// Crawl a website
    WebsiteCrawl,
}

const FILE_IMPORT_BINDINGS: &[EnvBinding] = &[
    EnvBinding::new("WORKSPACE_ID", "workspace_id"),
    EnvBinding::new("DOCUMENT_ID", "document_id"),
    EnvBinding::new("INPUT_BUCKET_NAME", "input_bucket_name"),
    EnvBinding::new("INPUT_OBJECT_KEY", "input_object_key"),
    EnvBinding::new("PROCESSING_BUCKET_NAME", "processing_bucket_name"),
    EnvBinding::new("PROCESSING_OBJECT_KEY", "processing_object_key"),
];

const WEBSITE_CRAWL_BINDINGS: &[EnvBinding] = &[
    EnvBinding::new("WORKSPACE_ID", "workspace_id"),
    EnvBinding::new("DOCUMENT_ID", "document_id"),
    EnvBinding::new("INPUT_BUCKET_NAME", "bucket_name"),
    EnvBinding::new("INPUT_OBJECT_KEY", "object_key"),
];

impl WorkflowKind {
    pub const ALL: [WorkflowKind; 2] = [WorkflowKind::FileImport, WorkflowKind::WebsiteCrawl];

    /// Name of the job state
    pub fn job_state(self) -> &'static str {
        match self {
            WorkflowKind::FileImport => "FileImportJob",
            WorkflowKind::WebsiteCrawl => "WebCrawlerJob",
        }
    }

    /// Prefix of submitted job names (`<prefix>-<workspace>-<document>`)
    pub fn job_name_prefix(self) -> &'static str {
        match self {
            WorkflowKind::FileImport => "FileImport",
            WorkflowKind::WebsiteCrawl => "WebCrawler",
        }
    }

    /// Container environment, each variable read from one input field
    pub fn env_bindings(self) -> &'static [EnvBinding] {
        match self {
            WorkflowKind::FileImport => FILE_IMPORT_BINDINGS,
            WorkflowKind::WebsiteCrawl => WEBSITE_CRAWL_BINDINGS,
        }
    }

    /// Overall timeout. File import is capped at 12 hours; website crawl
    /// declares none.
    pub fn default_timeout(self) -> Option<Duration> {
        match self {
            WorkflowKind::FileImport => Some(Duration::from_secs(12 * 60 * 60)),
            WorkflowKind::WebsiteCrawl => None,
        }
    }

    pub fn comment(self) -> &'static str {
        match self {
            WorkflowKind::FileImport => "File import workflow",
            WorkflowKind::WebsiteCrawl => "Website Crawling Workflow",
        }
    }

    /// Cause reported by the `Fail` state
    pub fn fail_cause(self) -> &'static str {
        match self {
            WorkflowKind::FileImport => "Import failed",
            WorkflowKind::WebsiteCrawl => "Crawler failed",
        }
    }
}

impl std::fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowKind::FileImport => write!(f, "file-import"),
            WorkflowKind::WebsiteCrawl => write!(f, "website-crawl"),
        }
    }
}

impl std::str::FromStr for WorkflowKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file-import" => Ok(WorkflowKind::FileImport),
            "website-crawl" => Ok(WorkflowKind::WebsiteCrawl),
            other => Err(Error::InvalidInput(format!(
                "Unknown workflow '{}', expected file-import or website-crawl",
                other
            ))),
        }
    }
}

/// Execution input for either workflow
///
/// Serializes to the flat JSON object the workflows read their fields from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub workspace_id: String,
    pub document_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_bucket_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_object_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_bucket_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_object_key: Option<String>,
}

impl WorkflowInput {
    /// Input for the file import workflow
    pub fn file_import(
        workspace_id: impl Into<String>,
        document_id: impl Into<String>,
        input_bucket_name: impl Into<String>,
        input_object_key: impl Into<String>,
        processing_bucket_name: impl Into<String>,
        processing_object_key: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            document_id: document_id.into(),
            input_bucket_name: Some(input_bucket_name.into()),
            input_object_key: Some(input_object_key.into()),
            processing_bucket_name: Some(processing_bucket_name.into()),
            processing_object_key: Some(processing_object_key.into()),
            ..Default::default()
        }
    }

    /// Input for the website crawl workflow
    pub fn website_crawl(
        workspace_id: impl Into<String>,
        document_id: impl Into<String>,
        bucket_name: impl Into<String>,
        object_key: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            document_id: document_id.into(),
            bucket_name: Some(bucket_name.into()),
            object_key: Some(object_key.into()),
            ..Default::default()
        }
    }

    pub fn key(&self) -> DocumentKey {
        DocumentKey::new(&self.workspace_id, &self.document_id)
    }

    /// The flat JSON object handed to the executor
    pub fn into_value(self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("workspace_id".into(), self.workspace_id.into());
        map.insert("document_id".into(), self.document_id.into());

        let optional = [
            ("bucket_name", self.bucket_name),
            ("object_key", self.object_key),
            ("input_bucket_name", self.input_bucket_name),
            ("input_object_key", self.input_object_key),
            ("processing_bucket_name", self.processing_bucket_name),
            ("processing_object_key", self.processing_object_key),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                map.insert(name.into(), value.into());
            }
        }

        serde_json::Value::Object(map)
    }
}

/// Extract the document key from an execution input
pub(crate) fn document_key(input: &serde_json::Value) -> Result<DocumentKey> {
    let field = |name: &str| {
        input
            .get(name)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("missing string attribute '{}'", name)))
    };

    Ok(DocumentKey {
        workspace_id: field("workspace_id")?,
        document_id: field("document_id")?,
    })
}
