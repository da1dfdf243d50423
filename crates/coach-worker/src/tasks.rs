//! Tasks this worker process registers.

use async_trait::async_trait;
use coach_core::{Task, TaskError};

/// Demo task used to verify the queue round trip.
pub struct PingTask;

#[async_trait]
impl Task for PingTask {
    fn name(&self) -> &'static str {
        "ping"
    }

    async fn run(&self, _args: &serde_json::Value) -> Result<serde_json::Value, TaskError> {
        Ok(serde_json::json!("pong"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_returns_pong() {
        let result = PingTask.run(&serde_json::Value::Null).await.unwrap();
        assert_eq!(result, serde_json::json!("pong"));
        assert_eq!(PingTask.name(), "ping");
    }
}
