//! Error types for rag-ops

use thiserror::Error;

/// Errors that can occur while validating schedules or running workflows
#[derive(Debug, Error)]
pub enum Error {
    /// Cron expression is structurally invalid (field count, dom/dow rule)
    #[error("Invalid cron expression: {0}")]
    InvalidCron(String),

    /// A single cron field did not match its grammar
    #[error("Invalid {field} value '{value}' in cron expression")]
    InvalidCronField { field: String, value: String },

    /// Simple schedule or end date failure
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Workflow input is missing required attributes
    #[error("Invalid workflow input: {0}")]
    InvalidInput(String),

    /// Document or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Batch job failure
    #[error("Batch job '{job_name}' failed: {reason}")]
    Job { job_name: String, reason: String },

    /// Timeout
    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    /// Document store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for rag-ops operations
pub type Result<T> = std::result::Result<T, Error>;
