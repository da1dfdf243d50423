//! Consumer loops that pop envelopes, dispatch to registered tasks and
//! record results.

use crate::backend::ResultBackend;
use crate::broker::Broker;
use crate::registry::TaskRegistry;
use coach_core::{QueueError, TaskMessage, TaskMeta};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct Worker {
    broker: Arc<dyn Broker>,
    backend: Arc<dyn ResultBackend>,
    registry: Arc<TaskRegistry>,
    queue: String,
    concurrency: usize,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        broker: Arc<dyn Broker>,
        backend: Arc<dyn ResultBackend>,
        registry: Arc<TaskRegistry>,
        queue: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            broker,
            backend,
            registry,
            queue: queue.into(),
            concurrency,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Runs consumer loops until the shutdown signal flips to true.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        let mut handles = Vec::with_capacity(self.concurrency);
        for loop_id in 0..self.concurrency {
            let worker = self.clone();
            let rx = shutdown.clone();
            handles.push(tokio::spawn(async move { worker.consume(loop_id, rx).await }));
        }
        let _ = join_all(handles).await;
    }

    async fn consume(&self, loop_id: usize, mut shutdown: watch::Receiver<bool>) {
        debug!(loop_id, queue = %self.queue, "consumer loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.broker.pop(&self.queue).await {
                Ok(Some(raw)) => self.handle_message(&raw).await,
                Ok(None) => self.idle(&mut shutdown).await,
                Err(e) => {
                    warn!(error = %e, "broker pop failed");
                    self.idle(&mut shutdown).await;
                }
            }
        }
        debug!(loop_id, "consumer loop stopped");
    }

    async fn idle(&self, shutdown: &mut watch::Receiver<bool>) {
        tokio::select! {
            _ = tokio::time::sleep(self.poll_interval) => {}
            _ = shutdown.changed() => {}
        }
    }

    async fn handle_message(&self, raw: &str) {
        let msg: TaskMessage = match serde_json::from_str(raw) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "discarding malformed task envelope");
                return;
            }
        };

        if let Err(e) = self.backend.store(&TaskMeta::started(&msg.id)).await {
            warn!(task = %msg.task, id = %msg.id, error = %e, "failed to record task start");
        }

        let meta = match self.registry.get(&msg.task) {
            Some(task) => match task.run(&msg.args).await {
                Ok(result) => TaskMeta::success(&msg.id, result),
                Err(e) => {
                    warn!(task = %msg.task, id = %msg.id, error = %e, "task failed");
                    TaskMeta::failure(&msg.id, e)
                }
            },
            None => {
                let err = QueueError::UnknownTask(msg.task.clone());
                warn!(id = %msg.id, error = %err, "no handler registered");
                TaskMeta::failure(&msg.id, err)
            }
        };

        if let Err(e) = self.backend.store(&meta).await {
            warn!(task = %msg.task, id = %msg.id, error = %e, "failed to record task result");
            return;
        }
        info!(task = %msg.task, id = %msg.id, status = ?meta.status, "task finished");
    }
}
