//! Result store keyed by task id.

use async_trait::async_trait;
use coach_core::{QueueError, TaskMeta};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Mutex;

fn meta_key(task_id: &str) -> String {
    format!("task-meta-{task_id}")
}

#[async_trait]
pub trait ResultBackend: Send + Sync {
    async fn store(&self, meta: &TaskMeta) -> Result<(), QueueError>;

    async fn fetch(&self, task_id: &str) -> Result<Option<TaskMeta>, QueueError>;
}

/// Redis-backed result store. Records are JSON strings with a TTL so
/// completed results expire instead of accumulating.
pub struct RedisBackend {
    conn: redis::aio::MultiplexedConnection,
    expires_secs: u64,
}

impl RedisBackend {
    pub async fn connect(url: &str, expires_secs: u64) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(|e| QueueError::Backend(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        Ok(Self { conn, expires_secs })
    }
}

#[async_trait]
impl ResultBackend for RedisBackend {
    async fn store(&self, meta: &TaskMeta) -> Result<(), QueueError> {
        let payload = serde_json::to_string(meta)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(meta_key(&meta.task_id), payload, self.expires_secs)
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn fetch(&self, task_id: &str) -> Result<Option<TaskMeta>, QueueError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .get(meta_key(task_id))
            .await
            .map_err(|e| QueueError::Backend(e.to_string()))?;
        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

/// In-memory result store (for testing).
#[derive(Default)]
pub struct InMemoryBackend {
    records: Mutex<HashMap<String, TaskMeta>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultBackend for InMemoryBackend {
    async fn store(&self, meta: &TaskMeta) -> Result<(), QueueError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| QueueError::Backend("lock poisoned".into()))?;
        records.insert(meta.task_id.clone(), meta.clone());
        Ok(())
    }

    async fn fetch(&self, task_id: &str) -> Result<Option<TaskMeta>, QueueError> {
        let records = self
            .records
            .lock()
            .map_err(|_| QueueError::Backend("lock poisoned".into()))?;
        Ok(records.get(task_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::TaskStatus;

    #[tokio::test]
    async fn test_store_and_fetch() {
        let backend = InMemoryBackend::new();
        backend.store(&TaskMeta::pending("t-1")).await.unwrap();

        let meta = backend.fetch("t-1").await.unwrap().unwrap();
        assert_eq!(meta.status, TaskStatus::Pending);
        assert!(backend.fetch("t-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_overwrites_status() {
        let backend = InMemoryBackend::new();
        backend.store(&TaskMeta::pending("t-1")).await.unwrap();
        backend
            .store(&TaskMeta::success("t-1", serde_json::json!("pong")))
            .await
            .unwrap();

        let meta = backend.fetch("t-1").await.unwrap().unwrap();
        assert_eq!(meta.status, TaskStatus::Success);
        assert_eq!(meta.result, Some(serde_json::json!("pong")));
    }
}
