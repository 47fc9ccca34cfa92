//! Worker pool for task execution
//!
//! Each task gets a fresh, named OS thread and a single-shot task channel.
//! A semaphore bounds the number of live unit threads; tasks beyond the bound
//! wait in FIFO order, up to `queue_capacity` of them. `task_timeout` bounds a
//! task's whole life in the pool, so a queued task behind a stuck unit still
//! resolves.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use offload_core::{
    task_channel, AnyUnit, Outcome, SqrtSumUnit, Task, TaskError, TaskId, UnitEnd, UnitRegistry,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use crate::config::WorkerPoolConfig;
use crate::handle::TaskHandle;

/// Point-in-time view of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Unit threads currently alive
    pub active: usize,
    /// Tasks waiting for a slot
    pub queued: usize,
    pub max_concurrency: usize,
    pub queue_capacity: usize,
    /// Tasks accepted since startup
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Worker pool for offloading computation units
///
/// Cheap to clone; clones share the same slots and counters.
///
/// # Example
///
/// ```ignore
/// let pool = WorkerPool::with_defaults(WorkerPoolConfig::default().with_max_concurrency(4));
///
/// let a = pool.execute_task::<_, f64>("sqrt-sum", &1_000u64)?;
/// let b = pool.execute_task::<_, f64>("sqrt-sum", &2_000u64)?;
/// let (a, b) = tokio::join!(a, b);
/// ```
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<Shared>,
}

struct Shared {
    registry: UnitRegistry,
    config: WorkerPoolConfig,
    slots: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    queued: AtomicUsize,
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl WorkerPool {
    /// Create a pool over the given units
    pub fn new(registry: UnitRegistry, config: WorkerPoolConfig) -> Self {
        info!(
            units = ?registry.names(),
            max_concurrency = config.max_concurrency,
            queue_capacity = config.queue_capacity,
            task_timeout = ?config.task_timeout,
            "Worker pool created"
        );

        Self {
            shared: Arc::new(Shared {
                slots: Arc::new(Semaphore::new(config.max_concurrency)),
                registry,
                config,
                active: Arc::new(AtomicUsize::new(0)),
                queued: AtomicUsize::new(0),
                submitted: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
        }
    }

    /// Create a pool with the built-in units registered, bounded by `config`
    pub fn with_defaults(config: WorkerPoolConfig) -> Self {
        let registry = UnitRegistry::builder()
            .unit(SqrtSumUnit::new(config.sqrt_sum_max_count))
            .build();
        Self::new(registry, config)
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.shared.config
    }

    /// Registered unit names
    pub fn units(&self) -> Vec<&'static str> {
        self.shared.registry.names()
    }

    /// Unit threads currently alive
    pub fn active(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Tasks waiting for a slot
    pub fn queued(&self) -> usize {
        self.shared.queued.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PoolStats {
        let shared = &self.shared;
        PoolStats {
            active: self.active(),
            queued: self.queued(),
            max_concurrency: shared.config.max_concurrency,
            queue_capacity: shared.config.queue_capacity,
            submitted: shared.submitted.load(Ordering::Relaxed),
            succeeded: shared.succeeded.load(Ordering::Relaxed),
            failed: shared.failed.load(Ordering::Relaxed),
        }
    }

    /// Offload `input` to the unit named `unit`
    ///
    /// Returns immediately. Unknown units, inputs the unit cannot decode and a
    /// full queue are rejected here, before anything is spawned. Everything
    /// else is reported through the returned handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn execute_task<I, O>(&self, unit: &str, input: &I) -> Result<TaskHandle<O>, TaskError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let payload =
            serde_json::to_value(input).map_err(|e| TaskError::invalid_input(e.to_string()))?;
        self.execute_value(unit, payload)
    }

    /// Like [`WorkerPool::execute_task`] for an already-encoded payload
    pub fn execute_value<O>(&self, unit: &str, payload: Value) -> Result<TaskHandle<O>, TaskError>
    where
        O: DeserializeOwned,
    {
        let unit = self.shared.registry.resolve(unit)?;
        unit.validate(&payload)?;
        self.submit(Task::new(unit.name(), payload), unit)
    }

    fn submit<O>(&self, task: Task, unit: Arc<dyn AnyUnit>) -> Result<TaskHandle<O>, TaskError> {
        let shared = self.shared.clone();

        // Take a free slot now if there is one, otherwise reserve a queue place
        let permit = match shared.slots.clone().try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                shared.reserve_queue_place()?;
                None
            }
        };

        shared.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(
            task_id = %task.id,
            unit = unit.name(),
            queued = permit.is_none(),
            "Task accepted"
        );

        let task_id = task.id;
        let unit_name = unit.name();
        let timeout = shared.config.task_timeout;
        let supervisor = tokio::spawn(async move {
            let lifetime = shared.acquire_and_run(task, unit, permit);
            let result = match tokio::time::timeout(timeout, lifetime).await {
                Ok(result) => result,
                Err(_) => Err(TaskError::TimedOut(timeout)),
            };
            shared.record(task_id, &result);
            result
        });

        Ok(TaskHandle::new(task_id, unit_name, supervisor))
    }
}

impl Shared {
    fn reserve_queue_place(&self) -> Result<(), TaskError> {
        let capacity = self.config.queue_capacity;
        self.queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |queued| {
                (queued < capacity).then_some(queued + 1)
            })
            .map(|_| ())
            .map_err(|queued| {
                warn!(queued, capacity, "Worker pool saturated, rejecting task");
                TaskError::PoolSaturated { queued }
            })
    }

    async fn acquire_and_run(
        &self,
        task: Task,
        unit: Arc<dyn AnyUnit>,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<Value, TaskError> {
        let permit = match permit {
            Some(permit) => permit,
            None => {
                // Released on acquire or when the timeout drops this future
                let _place = QueuePlace(&self.queued);
                self.slots
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| TaskError::Internal("worker pool closed".into()))?
            }
        };

        self.run(task, unit, permit).await
    }

    async fn run(
        &self,
        task: Task,
        unit: Arc<dyn AnyUnit>,
        permit: OwnedSemaphorePermit,
    ) -> Result<Value, TaskError> {
        let (caller, unit_end) = task_channel(task.id);

        // The thread owns the permit and the active guard, so the slot stays
        // taken until the unit really exits, even after a timeout.
        let guard = ActiveGuard::new(self.active.clone());
        std::thread::Builder::new()
            .name(format!("offload-{}", unit.name()))
            .spawn(move || {
                // Dropped in reverse order: the slot is free before `active` drops
                let _guard = guard;
                let _permit = permit;
                run_unit(unit, unit_end);
            })
            .map_err(|e| TaskError::SpawnFailed(e.to_string()))?;

        caller.send(task.input)?.recv().await
    }

    fn record(&self, task_id: TaskId, result: &Result<Value, TaskError>) {
        match result {
            Ok(_) => {
                self.succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(task_id = %task_id, "Task completed");
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(task_id = %task_id, error = %e, "Task failed");
            }
        }
    }
}

/// Body of a unit thread: one input in, one response out
fn run_unit(unit: Arc<dyn AnyUnit>, end: UnitEnd) {
    let task_id = end.task_id();

    let (payload, responder) = match end.recv_input() {
        Ok(received) => received,
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Unit never received its input");
            return;
        }
    };

    let outcome = Outcome::from(unit.invoke(payload));
    if !responder.respond(outcome) {
        debug!(task_id = %task_id, "Caller stopped waiting before the response was sent");
    }
}

/// A reserved queue place, given back on drop
struct QueuePlace<'a>(&'a AtomicUsize);

impl Drop for QueuePlace<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Counts a live unit thread; decrements on drop, including unwinding
struct ActiveGuard(Arc<AtomicUsize>);

impl ActiveGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self(active)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
