use coach_core::Task;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps registered task names to their implementations.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<&'static str, Arc<dyn Task>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Arc<dyn Task>) {
        self.tasks.insert(task.name(), task);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tasks.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coach_core::TaskError;

    struct NoopTask;

    #[async_trait]
    impl Task for NoopTask {
        fn name(&self) -> &'static str {
            "noop"
        }

        async fn run(&self, _args: &serde_json::Value) -> Result<serde_json::Value, TaskError> {
            Ok(serde_json::Value::Null)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TaskRegistry::new();
        registry.register(Arc::new(NoopTask));

        assert!(registry.get("noop").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["noop"]);
    }
}
