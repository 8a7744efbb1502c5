//! Batch job submission
//!
//! The workflow submits exactly one job per execution and waits for it to
//! finish (`submitJob.sync` semantics). A `BatchRunner` hides where that job
//! actually runs.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::RwLock;

/// A job to submit: name, queue, definition and container environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSubmission {
    pub job_name: String,
    pub job_queue: String,
    pub job_definition: String,
    /// Container environment overrides, in declaration order
    pub environment: Vec<(String, String)>,
}

impl JobSubmission {
    /// Look up an environment override
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Terminal job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// Result of a completed job, stored under `$.job` of the workflow output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobResult {
    pub job_id: String,
    pub job_name: String,
    pub job_queue: String,
    pub job_definition: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
}

impl JobResult {
    /// A successful result for `submission` that started at `started_at`
    pub fn succeeded(submission: &JobSubmission, started_at: DateTime<Utc>) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            job_name: submission.job_name.clone(),
            job_queue: submission.job_queue.clone(),
            job_definition: submission.job_definition.clone(),
            status: JobStatus::Succeeded,
            exit_code: Some(0),
            started_at,
            stopped_at: Utc::now(),
        }
    }
}

/// Backend that runs a job to completion
#[async_trait]
pub trait BatchRunner: Send + Sync {
    /// Submit a job and wait for it to finish
    ///
    /// Returns `Err` for any job that does not succeed.
    async fn submit_job_sync(&self, submission: &JobSubmission) -> Result<JobResult>;

    /// Runner name (e.g., "process", "scripted")
    fn name(&self) -> &str;
}

// ============================================================================
// Process Runner
// ============================================================================

/// Runs each job as a local shell command with the job environment
///
/// `JOB_NAME`, `JOB_QUEUE` and `JOB_DEFINITION` are exported alongside the
/// container overrides.
pub struct ProcessBatchRunner {
    command: String,
    working_dir: Option<PathBuf>,
}

impl ProcessBatchRunner {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl BatchRunner for ProcessBatchRunner {
    async fn submit_job_sync(&self, submission: &JobSubmission) -> Result<JobResult> {
        let started_at = Utc::now();

        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .env("JOB_NAME", &submission.job_name)
            .env("JOB_QUEUE", &submission.job_queue)
            .env("JOB_DEFINITION", &submission.job_definition)
            .envs(
                submission
                    .environment
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| Error::Job {
            job_name: submission.job_name.clone(),
            reason: format!("Failed to execute command: {}", e),
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        tracing::debug!(
            job_name = %submission.job_name,
            exit_code,
            stdout = %truncate_output(String::from_utf8_lossy(&output.stdout).to_string(), 2_000),
            "Batch job finished"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(Error::Job {
                job_name: submission.job_name.clone(),
                reason: format!(
                    "exit code {}: {}",
                    exit_code,
                    truncate_output(stderr.trim().to_string(), 2_000)
                ),
            });
        }

        Ok(JobResult::succeeded(submission, started_at))
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Truncate output to a maximum length
fn truncate_output(s: String, max_len: usize) -> String {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &s[..end])
}

// ============================================================================
// Scripted Runner
// ============================================================================

type JobHandler = dyn Fn(&JobSubmission) -> Result<JobResult> + Send + Sync;

/// Runner whose outcome is decided by a closure; records every submission
///
/// Used for dry runs and tests.
pub struct ScriptedBatchRunner {
    handler: Arc<JobHandler>,
    submissions: RwLock<Vec<JobSubmission>>,
}

impl ScriptedBatchRunner {
    pub fn new(
        handler: impl Fn(&JobSubmission) -> Result<JobResult> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            submissions: RwLock::new(Vec::new()),
        }
    }

    /// Every job succeeds immediately
    pub fn succeeding() -> Self {
        Self::new(|submission| Ok(JobResult::succeeded(submission, Utc::now())))
    }

    /// Every job fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(move |submission| {
            Err(Error::Job {
                job_name: submission.job_name.clone(),
                reason: reason.clone(),
            })
        })
    }

    /// Submissions received so far
    pub async fn submissions(&self) -> Vec<JobSubmission> {
        self.submissions.read().await.clone()
    }
}

#[async_trait]
impl BatchRunner for ScriptedBatchRunner {
    async fn submit_job_sync(&self, submission: &JobSubmission) -> Result<JobResult> {
        self.submissions.write().await.push(submission.clone());
        (self.handler)(submission)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
