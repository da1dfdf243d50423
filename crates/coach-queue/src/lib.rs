//! Broker, result backend, task registry, producer client and worker runner.

mod backend;
mod broker;
mod client;
mod registry;
mod worker;

pub use backend::{InMemoryBackend, RedisBackend, ResultBackend};
pub use broker::{Broker, InMemoryBroker, RedisBroker};
pub use client::QueueClient;
pub use registry::TaskRegistry;
pub use worker::Worker;
