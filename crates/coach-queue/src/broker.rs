//! Message broker abstraction over a named FIFO queue.

use async_trait::async_trait;
use coach_core::QueueError;
use redis::AsyncCommands;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Transport for task envelopes. Payloads are opaque JSON strings.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn push(&self, queue: &str, payload: &str) -> Result<(), QueueError>;

    /// Non-blocking pop; `None` when the queue is empty.
    async fn pop(&self, queue: &str) -> Result<Option<String>, QueueError>;
}

/// Redis-backed broker. Envelopes live on a list keyed by queue name.
pub struct RedisBroker {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisBroker {
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(|e| QueueError::Broker(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn push(&self, queue: &str, payload: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .lpush(queue, payload)
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        Ok(())
    }

    async fn pop(&self, queue: &str) -> Result<Option<String>, QueueError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn
            .rpop(queue, None)
            .await
            .map_err(|e| QueueError::Broker(e.to_string()))?;
        Ok(payload)
    }
}

/// In-memory broker (for testing).
#[derive(Default)]
pub struct InMemoryBroker {
    queues: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn push(&self, queue: &str, payload: &str) -> Result<(), QueueError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| QueueError::Broker("lock poisoned".into()))?;
        queues
            .entry(queue.to_string())
            .or_default()
            .push_back(payload.to_string());
        Ok(())
    }

    async fn pop(&self, queue: &str) -> Result<Option<String>, QueueError> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| QueueError::Broker("lock poisoned".into()))?;
        Ok(queues.get_mut(queue).and_then(|q| q.pop_front()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_broker_is_fifo() {
        let broker = InMemoryBroker::new();
        broker.push("tasks", "a").await.unwrap();
        broker.push("tasks", "b").await.unwrap();

        assert_eq!(broker.pop("tasks").await.unwrap().as_deref(), Some("a"));
        assert_eq!(broker.pop("tasks").await.unwrap().as_deref(), Some("b"));
        assert_eq!(broker.pop("tasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_queues_are_isolated() {
        let broker = InMemoryBroker::new();
        broker.push("tasks", "a").await.unwrap();

        assert_eq!(broker.pop("other").await.unwrap(), None);
        assert_eq!(broker.pop("tasks").await.unwrap().as_deref(), Some("a"));
    }
}
