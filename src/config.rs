//! Deployment configuration
//!
//! Loaded from the JSON file the configuration wizard writes
//! (`bin/config.json`). Only the sections this crate acts on are modelled;
//! unknown keys are ignored.

use crate::error::{Error, Result};
use crate::schedule::{ResolvedSchedule, SagemakerSchedule};
use crate::workflow::{BatchTarget, TableRef, WorkflowDefinition, WorkflowKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Resource name prefix
    #[serde(default)]
    pub prefix: String,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Path of the local document store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default)]
    pub llms: LlmsConfig,

    #[serde(default)]
    pub rag: RagConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sagemaker_schedule: Option<SagemakerSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagConfig {
    #[serde(default = "default_documents_table")]
    pub documents_table: String,

    /// AWS partition for service integration ARNs
    #[serde(default = "default_partition")]
    pub partition: String,

    #[serde(default)]
    pub workflows: WorkflowsConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            documents_table: default_documents_table(),
            partition: default_partition(),
            workflows: WorkflowsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_import: Option<WorkflowTargetConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_crawl: Option<WorkflowTargetConfig>,
}

/// Batch target of one workflow, plus an optional timeout override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTargetConfig {
    #[serde(flatten)]
    pub target: BatchTarget,

    /// Overrides the workflow's default timeout; `0` disables it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_hours: Option<u64>,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".rag-ops/documents.json")
}

fn default_documents_table() -> String {
    "documents".into()
}

fn default_partition() -> String {
    "aws".into()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check that enabled sections are usable
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if let Some(schedule) = &self.llms.sagemaker_schedule {
            if schedule.enabled {
                schedule.resolve(today)?;
            }
        }

        for kind in WorkflowKind::ALL {
            if let Some(target) = self.workflow_target(kind) {
                if target.target.job_queue.0.is_empty() || target.target.job_definition.0.is_empty() {
                    return Err(Error::Config(format!(
                        "{} workflow requires jobQueue and jobDefinition",
                        kind
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolved SageMaker schedule, if one is enabled
    pub fn sagemaker_schedule(&self, today: NaiveDate) -> Result<Option<ResolvedSchedule>> {
        match &self.llms.sagemaker_schedule {
            Some(schedule) if schedule.enabled => schedule.resolve(today).map(Some),
            _ => Ok(None),
        }
    }

    fn workflow_target(&self, kind: WorkflowKind) -> Option<&WorkflowTargetConfig> {
        match kind {
            WorkflowKind::FileImport => self.rag.workflows.file_import.as_ref(),
            WorkflowKind::WebsiteCrawl => self.rag.workflows.website_crawl.as_ref(),
        }
    }

    /// Build the definition of a configured workflow
    pub fn workflow_definition(&self, kind: WorkflowKind) -> Result<WorkflowDefinition> {
        let target = self.workflow_target(kind).ok_or_else(|| {
            Error::Config(format!("No batch target configured for the {} workflow", kind))
        })?;

        let mut definition = WorkflowDefinition::new(
            kind,
            TableRef(self.rag.documents_table.clone()),
            target.target.clone(),
        )
        .with_partition(&self.rag.partition);

        if let Some(hours) = target.timeout_hours {
            let timeout = match hours {
                0 => None,
                hours => {
                    let secs = hours.checked_mul(60 * 60).ok_or_else(|| {
                        Error::Config(format!(
                            "timeoutHours {} of the {} workflow is out of range",
                            hours, kind
                        ))
                    })?;
                    Some(Duration::from_secs(secs))
                }
            };
            definition = definition.with_timeout(timeout);
        }

        Ok(definition)
    }
}
