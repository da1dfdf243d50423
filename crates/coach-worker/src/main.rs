mod tasks;

use std::sync::Arc;

use anyhow::Result;
use coach_config::Settings;
use coach_queue::{RedisBackend, RedisBroker, TaskRegistry, Worker};
use tasks::PingTask;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let settings = Settings::from_env()?;

    let broker = Arc::new(RedisBroker::connect(&settings.redis_url).await?);
    let backend = Arc::new(RedisBackend::connect(&settings.redis_url, settings.result_expires).await?);

    let mut registry = TaskRegistry::new();
    registry.register(Arc::new(PingTask));
    info!("Registered tasks: {:?}", registry.names());

    let worker = Worker::new(
        broker,
        backend,
        Arc::new(registry),
        settings.queue.clone(),
        settings.concurrency,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
    });

    info!(
        queue = %settings.queue,
        concurrency = settings.concurrency,
        "Worker started"
    );
    worker.run(shutdown_rx).await;
    info!("Worker stopped");

    Ok(())
}
