//! # rag-ops
//!
//! Schedule validation and document ingestion workflows for the RAG chatbot
//! deployment.
//!
//! ## Overview
//!
//! - **cron**: regex grammar and validator for AWS EventBridge cron
//!   expressions (six fields, `L`/`W`/`#`/`?` tokens)
//! - **schedule**: SageMaker start/stop schedules, including the simple
//!   "time of day + weekdays" form
//! - **workflow**: file import and website crawl workflows, with Amazon States
//!   Language rendering and local execution
//!
//! ## Quick Start
//!
//! ```rust
//! use rag_ops::{AwsCronValidator, CronField, CronGrammar};
//!
//! let expr = AwsCronValidator::validate("0/15 8-17 ? * MON-FRI *").unwrap();
//! assert_eq!(expr.schedule_expression(), "cron(0/15 8-17 ? * MON-FRI *)");
//!
//! let grammar = CronGrammar::global();
//! assert!(grammar.matches(CronField::DayOfWeek, "MON#2"));
//! assert!(!grammar.matches(CronField::Month, "jan"));
//! ```
//!
//! ## Running a workflow
//!
//! ```rust
//! use std::sync::Arc;
//! use rag_ops::{
//!     BatchTarget, DocumentKey, DocumentStatus, DocumentStore, JobDefinitionRef, JobQueueRef,
//!     MemoryDocumentStore, ScriptedBatchRunner, TableRef, WorkflowDefinition, WorkflowExecutor,
//!     WorkflowInput, WorkflowKind,
//! };
//!
//! # async fn example() -> rag_ops::Result<()> {
//! let definition = WorkflowDefinition::new(
//!     WorkflowKind::WebsiteCrawl,
//!     TableRef("documents".into()),
//!     BatchTarget {
//!         job_queue: JobQueueRef("crawler-queue".into()),
//!         job_definition: JobDefinitionRef("crawler-job".into()),
//!     },
//! );
//!
//! let store = Arc::new(MemoryDocumentStore::new());
//! let executor = WorkflowExecutor::new(store.clone(), Arc::new(ScriptedBatchRunner::succeeding()));
//!
//! let input = WorkflowInput::website_crawl("ws", "doc", "bucket", "crawl/doc.json");
//! let execution = executor.execute(&definition, input.into_value()).await?;
//! assert!(execution.succeeded());
//!
//! let doc = store.get(&DocumentKey::new("ws", "doc")).await?.unwrap();
//! assert_eq!(doc.status, DocumentStatus::Processed);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod cron;
pub mod error;
pub mod schedule;
pub mod store;
pub mod types;
pub mod workflow;

// Re-export core types
pub use batch::{BatchRunner, JobResult, JobStatus, JobSubmission, ProcessBatchRunner, ScriptedBatchRunner};
pub use config::Config;
pub use cron::{AwsCronValidator, CronExpression, CronField, CronGrammar};
pub use error::{Error, Result};
pub use schedule::{ClockTime, ResolvedSchedule, SagemakerSchedule, ScheduleFormat, Weekday};
pub use store::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use types::{Document, DocumentKey, DocumentStatus, Execution, ExecutionStatus};
pub use workflow::{
    BatchTarget, JobDefinitionRef, JobQueueRef, TableRef, WorkflowDefinition, WorkflowExecutor,
    WorkflowInput, WorkflowKind,
};
