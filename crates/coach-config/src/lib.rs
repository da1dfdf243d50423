//! Environment-driven settings shared by the API and worker binaries.

use std::env;
use thiserror::Error;

pub const DEFAULT_REDIS_URL: &str = "redis://redis:6379/0";
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_TASK_QUEUE: &str = "tasks";
pub const DEFAULT_WORKER_CONCURRENCY: usize = 4;
pub const DEFAULT_RESULT_EXPIRES_SECS: u64 = 86_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime settings, resolved once at process start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Broker and result-store address (`REDIS_URL`).
    pub redis_url: String,
    /// API bind address (`HTTP_ADDR`).
    pub http_addr: String,
    /// Broker list the worker consumes (`TASK_QUEUE`).
    pub queue: String,
    /// Parallel consumer loops per worker process (`WORKER_CONCURRENCY`).
    pub concurrency: usize,
    /// Result record TTL in seconds (`RESULT_EXPIRES`).
    pub result_expires: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| env::var(key).ok())
    }

    fn load(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let redis_url = get("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());
        let http_addr = get("HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let queue = get("TASK_QUEUE").unwrap_or_else(|| DEFAULT_TASK_QUEUE.to_string());

        let concurrency = match get("WORKER_CONCURRENCY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    var: "WORKER_CONCURRENCY",
                    value: raw,
                })?,
            None => DEFAULT_WORKER_CONCURRENCY,
        };

        let result_expires = match get("RESULT_EXPIRES") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                var: "RESULT_EXPIRES",
                value: raw,
            })?,
            None => DEFAULT_RESULT_EXPIRES_SECS,
        };

        Ok(Self {
            redis_url,
            http_addr,
            queue,
            concurrency,
            result_expires,
        })
    }
}
