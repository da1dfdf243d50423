//! Producer-side handle for enqueueing tasks and reading results.

use crate::backend::ResultBackend;
use crate::broker::Broker;
use coach_core::{QueueError, TaskMessage, TaskMeta};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Clone)]
pub struct QueueClient {
    broker: Arc<dyn Broker>,
    backend: Arc<dyn ResultBackend>,
    queue: String,
}

impl QueueClient {
    pub fn new(
        broker: Arc<dyn Broker>,
        backend: Arc<dyn ResultBackend>,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            backend,
            queue: queue.into(),
        }
    }

    /// Enqueues a task by registered name and returns its id.
    ///
    /// The PENDING record is written before the envelope is pushed so a fast
    /// worker cannot have its terminal record clobbered by the producer.
    pub async fn enqueue(
        &self,
        task: &str,
        args: serde_json::Value,
    ) -> Result<String, QueueError> {
        let msg = TaskMessage::new(task, args);
        self.backend.store(&TaskMeta::pending(&msg.id)).await?;
        self.broker
            .push(&self.queue, &serde_json::to_string(&msg)?)
            .await?;
        Ok(msg.id)
    }

    /// Current result record for a task, if any.
    pub async fn result(&self, task_id: &str) -> Result<Option<TaskMeta>, QueueError> {
        self.backend.fetch(task_id).await
    }

    /// Polls until the task reaches a terminal state or the timeout elapses.
    pub async fn wait(&self, task_id: &str, timeout: Duration) -> Result<TaskMeta, QueueError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(meta) = self.backend.fetch(task_id).await? {
                if meta.status.is_terminal() {
                    return Ok(meta);
                }
            }
            if Instant::now() >= deadline {
                return Err(QueueError::ResultTimeout(task_id.to_string()));
            }
            tokio::time::sleep(RESULT_POLL_INTERVAL).await;
        }
    }
}
