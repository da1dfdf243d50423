use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Broker operation failed: {0}")]
    Broker(String),

    #[error("Result backend operation failed: {0}")]
    Backend(String),

    #[error("Failed to serialize task payload: {0}")]
    Serialization(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Timed out waiting for result of task {0}")]
    ResultTimeout(String),
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::Serialization(err.to_string())
    }
}

/// Error returned by a task body. Recorded verbatim in the result store.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid task arguments: {0}")]
    InvalidArgs(String),

    #[error("Task execution failed: {0}")]
    Failed(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// JSON envelope pushed onto the broker list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub id: String,
    pub task: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default)]
    pub retries: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl TaskMessage {
    pub fn new(task: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task: task.into(),
            args,
            retries: 0,
            enqueued_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure,
}

impl TaskStatus {
    /// True once the status can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }
}

/// Result-store record for a single task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMeta {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub date_done: Option<DateTime<Utc>>,
}

impl TaskMeta {
    pub fn pending(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            date_done: None,
        }
    }

    pub fn started(task_id: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Started,
            ..Self::pending(task_id)
        }
    }

    pub fn success(task_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Success,
            result: Some(result),
            error: None,
            date_done: Some(Utc::now()),
        }
    }

    pub fn failure(task_id: impl Into<String>, error: impl ToString) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failure,
            result: None,
            error: Some(error.to_string()),
            date_done: Some(Utc::now()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task Trait
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait Task: Send + Sync {
    /// Registered name the broker envelope routes on.
    fn name(&self) -> &'static str;

    async fn run(&self, args: &serde_json::Value) -> Result<serde_json::Value, TaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_uppercase() {
        let s = serde_json::to_string(&TaskStatus::Success).unwrap();
        assert_eq!(s, "\"SUCCESS\"");
        let s = serde_json::to_string(&TaskStatus::Pending).unwrap();
        assert_eq!(s, "\"PENDING\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failure.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Started.is_terminal());
    }

    #[test]
    fn test_meta_constructors() {
        let pending = TaskMeta::pending("t-1");
        assert_eq!(pending.status, TaskStatus::Pending);
        assert!(pending.date_done.is_none());

        let done = TaskMeta::success("t-1", serde_json::json!("pong"));
        assert_eq!(done.status, TaskStatus::Success);
        assert_eq!(done.result, Some(serde_json::json!("pong")));
        assert!(done.date_done.is_some());

        let failed = TaskMeta::failure("t-1", "boom");
        assert_eq!(failed.status, TaskStatus::Failure);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = TaskMessage::new("ping", serde_json::Value::Null);
        let b = TaskMessage::new("ping", serde_json::Value::Null);
        assert_ne!(a.id, b.id);
        assert_eq!(a.task, "ping");
        assert_eq!(a.retries, 0);
    }
}
