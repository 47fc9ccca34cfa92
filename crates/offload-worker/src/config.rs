// Worker pool configuration
// Configuration is via WORKER_POOL_* env vars; every value has a default.

use std::time::Duration;

use anyhow::{Context, Result};
use offload_core::SqrtSumUnit;

/// Default number of tasks allowed to wait for a slot
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default bound on how long a unit may take to respond
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Maximum number of live unit threads
    pub max_concurrency: usize,

    /// Maximum number of tasks waiting for a slot
    pub queue_capacity: usize,

    /// Bound on a task's whole life in the pool, waiting for a slot included
    pub task_timeout: Duration,

    /// Largest count the built-in sqrt-sum unit accepts
    pub sqrt_sum_max_count: u64,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            task_timeout: DEFAULT_TASK_TIMEOUT,
            sqrt_sum_max_count: SqrtSumUnit::DEFAULT_MAX_COUNT,
        }
    }
}

fn default_max_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl WorkerPoolConfig {
    /// Create configuration from environment variables
    ///
    /// - `WORKER_POOL_MAX_CONCURRENCY`
    /// - `WORKER_POOL_QUEUE_CAPACITY`
    /// - `WORKER_POOL_TASK_TIMEOUT_MS`
    /// - `WORKER_POOL_SQRT_SUM_MAX_COUNT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (extracted for testing)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(value) = non_empty(lookup("WORKER_POOL_MAX_CONCURRENCY")) {
            let max: usize = value
                .parse()
                .with_context(|| format!("Invalid WORKER_POOL_MAX_CONCURRENCY: {}", value))?;
            config = config.with_max_concurrency(max);
        }

        if let Some(value) = non_empty(lookup("WORKER_POOL_QUEUE_CAPACITY")) {
            let capacity: usize = value
                .parse()
                .with_context(|| format!("Invalid WORKER_POOL_QUEUE_CAPACITY: {}", value))?;
            config = config.with_queue_capacity(capacity);
        }

        if let Some(value) = non_empty(lookup("WORKER_POOL_TASK_TIMEOUT_MS")) {
            let millis: u64 = value
                .parse()
                .with_context(|| format!("Invalid WORKER_POOL_TASK_TIMEOUT_MS: {}", value))?;
            anyhow::ensure!(millis > 0, "WORKER_POOL_TASK_TIMEOUT_MS must be positive");
            config = config.with_task_timeout(Duration::from_millis(millis));
        }

        if let Some(value) = non_empty(lookup("WORKER_POOL_SQRT_SUM_MAX_COUNT")) {
            let max: u64 = value
                .parse()
                .with_context(|| format!("Invalid WORKER_POOL_SQRT_SUM_MAX_COUNT: {}", value))?;
            config = config.with_sqrt_sum_max_count(max);
        }

        Ok(config)
    }

    /// Set maximum concurrency (at least 1)
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }

    /// Set queue capacity (0 disables queuing)
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the task timeout
    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    /// Set the largest count the sqrt-sum unit accepts
    pub fn with_sqrt_sum_max_count(mut self, max: u64) -> Self {
        self.sqrt_sum_max_count = max;
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
