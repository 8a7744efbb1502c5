//! Workflow definitions and their Amazon States Language rendering

use super::WorkflowKind;
use crate::batch::JobSubmission;
use crate::error::{Error, Result};
use crate::types::{DocumentKey, DocumentStatus};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

pub const SET_PROCESSING: &str = "SetProcessing";
pub const SET_PROCESSED: &str = "SetProcessed";
pub const SUCCESS: &str = "Success";
pub const HANDLE_ERROR: &str = "HandleError";
pub const FAIL: &str = "Fail";

/// ARN or name of a batch job queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobQueueRef(pub String);

/// ARN or name of a batch job definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDefinitionRef(pub String);

/// Name of the documents table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableRef(pub String);

/// Where the job state submits its job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTarget {
    pub job_queue: JobQueueRef,
    pub job_definition: JobDefinitionRef,
}

/// A container environment variable read from a top-level input field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvBinding {
    pub name: &'static str,
    pub field: &'static str,
}

impl EnvBinding {
    pub const fn new(name: &'static str, field: &'static str) -> Self {
        Self { name, field }
    }

    /// JSONPath of the input field, e.g. `$.workspace_id`
    pub fn path(&self) -> String {
        format!("$.{}", self.field)
    }
}

/// A fully wired ingestion workflow
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    pub kind: WorkflowKind,
    pub table: TableRef,
    pub target: BatchTarget,
    pub timeout: Option<Duration>,
    /// AWS partition used in service integration ARNs
    pub partition: String,
}

impl WorkflowDefinition {
    /// Definition with the kind's default timeout in the `aws` partition
    pub fn new(kind: WorkflowKind, table: TableRef, target: BatchTarget) -> Self {
        Self {
            kind,
            table,
            target,
            timeout: kind.default_timeout(),
            partition: "aws".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    pub fn job_state(&self) -> &'static str {
        self.kind.job_state()
    }

    /// `<prefix>-<workspace_id>-<document_id>`
    pub fn job_name(&self, key: &DocumentKey) -> String {
        format!(
            "{}-{}-{}",
            self.kind.job_name_prefix(),
            key.workspace_id,
            key.document_id
        )
    }

    /// Build the job submission for an execution input
    ///
    /// Every binding must resolve to a string or number field of `input`.
    pub fn submission(&self, key: &DocumentKey, input: &Value) -> Result<JobSubmission> {
        let environment = self
            .kind
            .env_bindings()
            .iter()
            .map(|binding| {
                let value = match input.get(binding.field) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => {
                        return Err(Error::InvalidInput(format!(
                            "The JSONPath '{}' specified for the field '{}' could not be found in the input",
                            binding.path(),
                            binding.name
                        )))
                    }
                };
                Ok((binding.name.to_string(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(JobSubmission {
            job_name: self.job_name(key),
            job_queue: self.target.job_queue.0.clone(),
            job_definition: self.target.job_definition.0.clone(),
            environment,
        })
    }

    fn resource(&self, integration: &str) -> String {
        format!("arn:{}:states:::{}", self.partition, integration)
    }

    fn update_status_state(&self, status: DocumentStatus, next: &str, discard: bool) -> Value {
        // The error handler writes through its own `:error` placeholder
        let (expression, placeholder) = match status {
            DocumentStatus::Error => ("set #status = :error", ":error"),
            _ => ("set #status=:statusValue", ":statusValue"),
        };
        let mut state = json!({
            "Type": "Task",
            "Resource": self.resource("dynamodb:updateItem"),
            "Parameters": {
                "TableName": self.table.0,
                "Key": {
                    "workspace_id": { "S.$": "$.workspace_id" },
                    "document_id": { "S.$": "$.document_id" }
                },
                "UpdateExpression": expression,
                "ExpressionAttributeNames": { "#status": "status" },
                "ExpressionAttributeValues": { (placeholder): { "S": status.to_string() } }
            },
            "Next": next
        });
        if discard {
            state["ResultPath"] = Value::Null;
        }
        state
    }

    /// The timeout sits on the job state so `States.Timeout` reaches the
    /// catch and the document ends in `error`
    fn job_state_json(&self) -> Value {
        let environment: Vec<Value> = self
            .kind
            .env_bindings()
            .iter()
            .map(|b| json!({ "Name": b.name, "Value.$": b.path() }))
            .collect();

        let mut state = json!({
            "Type": "Task",
            "Resource": self.resource("batch:submitJob.sync"),
            "Parameters": {
                "JobDefinition": self.target.job_definition.0,
                "JobName.$": format!(
                    "States.Format('{}-{{}}-{{}}', $.workspace_id, $.document_id)",
                    self.kind.job_name_prefix()
                ),
                "JobQueue": self.target.job_queue.0,
                "ContainerOverrides": { "Environment": environment }
            },
            "ResultPath": "$.job",
            "Next": SET_PROCESSED,
            "Catch": [{
                "ErrorEquals": ["States.ALL"],
                "ResultPath": "$.job",
                "Next": HANDLE_ERROR
            }]
        });
        if let Some(timeout) = self.timeout {
            state["TimeoutSeconds"] = json!(timeout.as_secs());
        }
        state
    }

    /// Render as an Amazon States Language document
    pub fn to_asl(&self) -> Value {
        let mut states = serde_json::Map::new();
        states.insert(
            SET_PROCESSING.into(),
            self.update_status_state(DocumentStatus::Processing, self.job_state(), true),
        );
        states.insert(self.job_state().into(), self.job_state_json());
        states.insert(
            SET_PROCESSED.into(),
            self.update_status_state(DocumentStatus::Processed, SUCCESS, true),
        );
        states.insert(SUCCESS.into(), json!({ "Type": "Succeed" }));
        states.insert(
            HANDLE_ERROR.into(),
            self.update_status_state(DocumentStatus::Error, FAIL, false),
        );
        states.insert(
            FAIL.into(),
            json!({ "Type": "Fail", "Cause": self.kind.fail_cause() }),
        );

        json!({
            "Comment": self.kind.comment(),
            "StartAt": SET_PROCESSING,
            "States": Value::Object(states),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowInput;

    fn definition(kind: WorkflowKind) -> WorkflowDefinition {
        WorkflowDefinition::new(
            kind,
            TableRef("documents".to_string()),
            BatchTarget {
                job_queue: JobQueueRef("arn:aws:batch:us-east-1:123:job-queue/q".to_string()),
                job_definition: JobDefinitionRef(
                    "arn:aws:batch:us-east-1:123:job-definition/d".to_string(),
                ),
            },
        )
    }

    #[test]
    fn test_job_name() {
        let def = definition(WorkflowKind::WebsiteCrawl);
        assert_eq!(def.job_name(&DocumentKey::new("ws", "doc")), "WebCrawler-ws-doc");
    }

    #[test]
    fn test_submission_file_import() {
        let def = definition(WorkflowKind::FileImport);
        let input = WorkflowInput::file_import("ws", "doc", "in", "in/key", "proc", "proc/key");
        let key = input.key();
        let submission = def.submission(&key, &input.into_value()).unwrap();

        assert_eq!(submission.job_name, "FileImport-ws-doc");
        assert_eq!(submission.job_queue, "arn:aws:batch:us-east-1:123:job-queue/q");
        assert_eq!(submission.env("INPUT_OBJECT_KEY"), Some("in/key"));
        assert_eq!(submission.env("PROCESSING_BUCKET_NAME"), Some("proc"));
        assert_eq!(submission.environment.len(), 6);
    }

    #[test]
    fn test_submission_missing_field() {
        let def = definition(WorkflowKind::FileImport);
        let input = WorkflowInput::website_crawl("ws", "doc", "bucket", "key");
        let key = input.key();
        let err = def.submission(&key, &input.into_value()).unwrap_err();
        assert!(err.to_string().contains("$.input_bucket_name"));
    }

    #[test]
    fn test_asl_file_import() {
        let asl = definition(WorkflowKind::FileImport).to_asl();

        assert_eq!(asl["StartAt"], "SetProcessing");
        assert!(asl.get("TimeoutSeconds").is_none());
        assert_eq!(asl["Comment"], "File import workflow");

        let states = &asl["States"];
        assert_eq!(states["SetProcessing"]["Next"], "FileImportJob");
        assert!(states["SetProcessing"]["ResultPath"].is_null());
        assert_eq!(
            states["SetProcessing"]["Parameters"]["ExpressionAttributeValues"][":statusValue"]["S"],
            "processing"
        );

        let job = &states["FileImportJob"];
        assert_eq!(job["Resource"], "arn:aws:states:::batch:submitJob.sync");
        assert_eq!(
            job["Parameters"]["JobName.$"],
            "States.Format('FileImport-{}-{}', $.workspace_id, $.document_id)"
        );
        assert_eq!(job["Catch"][0]["ErrorEquals"][0], "States.ALL");
        assert_eq!(job["Catch"][0]["Next"], "HandleError");
        assert_eq!(job["ResultPath"], "$.job");
        assert_eq!(job["TimeoutSeconds"], 43_200);

        assert_eq!(states["SetProcessed"]["Next"], "Success");
        assert_eq!(states["Success"]["Type"], "Succeed");
        assert_eq!(states["HandleError"]["Next"], "Fail");
        assert_eq!(
            states["HandleError"]["Parameters"]["UpdateExpression"],
            "set #status = :error"
        );
        assert_eq!(
            states["HandleError"]["Parameters"]["ExpressionAttributeValues"][":error"]["S"],
            "error"
        );
        assert_eq!(
            states["SetProcessed"]["Parameters"]["UpdateExpression"],
            "set #status=:statusValue"
        );
        assert_eq!(states["Fail"]["Cause"], "Import failed");
    }

    #[test]
    fn test_asl_website_crawl_has_no_timeout() {
        let asl = definition(WorkflowKind::WebsiteCrawl)
            .with_partition("aws-cn")
            .to_asl();

        assert!(asl.get("TimeoutSeconds").is_none());
        assert!(asl["States"]["WebCrawlerJob"].get("TimeoutSeconds").is_none());
        let env = &asl["States"]["WebCrawlerJob"]["Parameters"]["ContainerOverrides"]["Environment"];
        assert_eq!(env.as_array().unwrap().len(), 4);
        assert_eq!(env[2]["Name"], "INPUT_BUCKET_NAME");
        assert_eq!(env[2]["Value.$"], "$.bucket_name");
        assert_eq!(
            asl["States"]["HandleError"]["Resource"],
            "arn:aws-cn:states:::dynamodb:updateItem"
        );
        assert_eq!(asl["States"]["Fail"]["Cause"], "Crawler failed");
    }
}
