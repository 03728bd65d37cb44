//! Error types for task operations.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidFieldValue,
    TaskNotFound,
    DatabaseError,
}

/// Failure of a task service operation.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Client input was rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(i64),

    /// Storage fault. Not retried.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        TaskError::Storage(err)
    }
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        TaskError::Validation(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TaskError::Validation(_) => ErrorCode::InvalidFieldValue,
            TaskError::NotFound(_) => ErrorCode::TaskNotFound,
            TaskError::Storage(_) => ErrorCode::DatabaseError,
        }
    }

    /// HTTP status code the error maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::Validation(_) => 400,
            TaskError::NotFound(_) => 404,
            TaskError::Storage(_) => 500,
        }
    }

    /// Message safe to show to a client. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            TaskError::Validation(message) => message.clone(),
            TaskError::NotFound(_) => "Task not found".to_string(),
            TaskError::Storage(_) => "internal error".to_string(),
        }
    }
}

/// Error body returned by the JSON API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
}

impl From<&TaskError> for ErrorBody {
    fn from(err: &TaskError) -> Self {
        Self {
            error: err.public_message(),
            code: err.code(),
        }
    }
}

/// Result type for task service operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;
