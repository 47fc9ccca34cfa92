// Offload Core
//
// Runtime-agnostic building blocks for handing a unit of work to an isolated
// execution context and getting exactly one answer back.
//
// Key design decisions:
// - A task channel is single-shot: each end is consumed by the operation that uses it
// - Units declare typed Input/Output; the registry erases them to JSON payloads
// - Input validation happens once, at dispatch, by decoding into the unit's Input type
// - Arithmetic strategies are a closed enum resolved through an explicit key mapping

pub mod calculator;
pub mod channel;
pub mod error;
pub mod registry;
pub mod strategy;
pub mod task;
pub mod unit;
pub mod units;

// Re-exports for convenience
pub use calculator::{parse_operand, CalculatorService};
pub use channel::{task_channel, CallerEnd, PendingResponse, Responder, UnitEnd};
pub use error::{Result, TaskError, UnitError};
pub use registry::{UnitRegistry, UnitRegistryBuilder};
pub use strategy::{ArithmeticStrategy, CalculationError};
pub use task::{InputMessage, Outcome, ResponseMessage, Task, TaskId};
pub use unit::{erase, AnyUnit, ComputationUnit};
pub use units::SqrtSumUnit;
