//! Worker pool for offloading CPU-bound work
//!
//! This crate provides:
//! - [`WorkerPool`] - spawns one isolated thread per task, bounded by a semaphore
//! - [`WorkerPoolConfig`] - concurrency, queue capacity and timeout settings
//! - [`TaskHandle`] - the single-resolution future returned by a dispatch
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         WorkerPool                            │
//! │  execute_task(unit, input)                                    │
//! │    ├─ resolve unit ─ validate input ─ check queue  (sync)     │
//! │    └─ supervisor (tokio task, whole body under timeout)       │
//! │         ├─ acquire slot (Semaphore, FIFO)                     │
//! │         ├─ spawn unit thread ──► recv input ─ compute ─ reply │
//! │         └─ await reply ──► TaskHandle resolves                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use offload_worker::{WorkerPool, WorkerPoolConfig};
//!
//! let pool = WorkerPool::with_defaults(WorkerPoolConfig::default());
//! let handle = pool.execute_task::<_, f64>("sqrt-sum", &5u64)?;
//! let result = handle.await?;
//! ```

mod config;
mod handle;
mod pool;

pub use config::WorkerPoolConfig;
pub use handle::TaskHandle;
pub use pool::{PoolStats, WorkerPool};

// Core types callers need alongside the pool
pub use offload_core::{ComputationUnit, TaskError, UnitError, UnitRegistry};
