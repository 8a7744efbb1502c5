//! Local execution of ingestion workflows
//!
//! Runs a [`WorkflowDefinition`] against a [`DocumentStore`] and a
//! [`BatchRunner`] with the same transitions the state machine declares.
//! A failed job is an execution outcome, not an `Err`: `Err` is returned
//! only when the input is unusable or a status write fails.

use super::definition::{
    WorkflowDefinition, FAIL, HANDLE_ERROR, SET_PROCESSED, SET_PROCESSING, SUCCESS,
};
use super::document_key;
use crate::batch::{BatchRunner, JobResult};
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use crate::types::{DocumentKey, DocumentStatus, Execution, ExecutionStatus};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

/// Executes ingestion workflows
pub struct WorkflowExecutor {
    store: Arc<dyn DocumentStore>,
    runner: Arc<dyn BatchRunner>,
}

/// How the job state ended
enum JobOutcome {
    Succeeded(JobResult),
    Failed { error: &'static str, cause: String },
}

impl WorkflowExecutor {
    pub fn new(store: Arc<dyn DocumentStore>, runner: Arc<dyn BatchRunner>) -> Self {
        Self { store, runner }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Run one execution to completion
    pub async fn execute(&self, definition: &WorkflowDefinition, input: Value) -> Result<Execution> {
        let key = document_key(&input)?;
        let started_at = Utc::now();
        let mut states = Vec::with_capacity(4);

        tracing::info!(
            workflow = %definition.kind,
            workspace_id = %key.workspace_id,
            document_id = %key.document_id,
            "Workflow execution started"
        );

        enter(&mut states, &key, SET_PROCESSING);
        self.store.set_status(&key, DocumentStatus::Processing).await?;

        enter(&mut states, &key, definition.job_state());
        let outcome = self.run_job(definition, &key, &input).await;

        let mut output = input;
        let execution = match outcome {
            JobOutcome::Succeeded(job) => {
                output["job"] = serde_json::to_value(&job)?;

                enter(&mut states, &key, SET_PROCESSED);
                self.store.set_status(&key, DocumentStatus::Processed).await?;
                enter(&mut states, &key, SUCCESS);

                tracing::info!(
                    workflow = %definition.kind,
                    workspace_id = %key.workspace_id,
                    document_id = %key.document_id,
                    job_id = %job.job_id,
                    "Workflow execution succeeded"
                );
                finish(definition, key, started_at, states, ExecutionStatus::Succeeded)
                    .with_output(output)
            }
            JobOutcome::Failed { error, cause } => {
                output["job"] = json!({ "Error": error, "Cause": cause });

                enter(&mut states, &key, HANDLE_ERROR);
                self.store.set_status(&key, DocumentStatus::Error).await?;
                enter(&mut states, &key, FAIL);

                tracing::warn!(
                    workflow = %definition.kind,
                    workspace_id = %key.workspace_id,
                    document_id = %key.document_id,
                    error = %error,
                    cause = %cause,
                    "Workflow execution failed"
                );
                finish(definition, key, started_at, states, ExecutionStatus::Failed)
                    .with_failure(error, definition.kind.fail_cause())
            }
        };

        Ok(execution)
    }

    /// Run several executions concurrently
    ///
    /// Executions are independent; results keep the order of `inputs`.
    pub async fn run_many(
        &self,
        definition: &WorkflowDefinition,
        inputs: Vec<Value>,
    ) -> Vec<Result<Execution>> {
        futures::future::join_all(
            inputs
                .into_iter()
                .map(|input| self.execute(definition, input)),
        )
        .await
    }

    async fn run_job(
        &self,
        definition: &WorkflowDefinition,
        key: &DocumentKey,
        input: &Value,
    ) -> JobOutcome {
        let submission = match definition.submission(key, input) {
            Ok(submission) => submission,
            Err(e) => {
                return JobOutcome::Failed {
                    error: "States.Runtime",
                    cause: e.to_string(),
                }
            }
        };

        tracing::debug!(
            job_name = %submission.job_name,
            job_queue = %submission.job_queue,
            runner = self.runner.name(),
            "Submitting batch job"
        );

        let result = match definition.timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.runner.submit_job_sync(&submission)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(timeout.as_secs())),
                }
            }
            None => self.runner.submit_job_sync(&submission).await,
        };

        match result {
            Ok(job) => JobOutcome::Succeeded(job),
            Err(Error::Timeout(secs)) => JobOutcome::Failed {
                error: "States.Timeout",
                cause: format!("Job '{}' did not finish within {}s", submission.job_name, secs),
            },
            Err(e) => JobOutcome::Failed {
                error: "States.TaskFailed",
                cause: e.to_string(),
            },
        }
    }
}

fn enter(states: &mut Vec<String>, key: &DocumentKey, state: &str) {
    tracing::debug!(
        workspace_id = %key.workspace_id,
        document_id = %key.document_id,
        state = %state,
        "Entering state"
    );
    states.push(state.to_string());
}

fn finish(
    definition: &WorkflowDefinition,
    key: DocumentKey,
    started_at: DateTime<Utc>,
    states: Vec<String>,
    status: ExecutionStatus,
) -> Execution {
    let ended_at = Utc::now();
    Execution {
        id: format!("exec-{}", uuid::Uuid::new_v4()),
        workflow: definition.name(),
        key,
        status,
        started_at,
        ended_at,
        duration_ms: (ended_at - started_at).num_milliseconds().max(0) as u64,
        output: None,
        error: None,
        cause: None,
        states,
    }
}

impl Execution {
    fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }

    fn with_failure(mut self, error: &str, cause: &str) -> Self {
        self.error = Some(error.to_string());
        self.cause = Some(cause.to_string());
        self
    }
}
