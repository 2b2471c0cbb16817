//! Core concurrency engine: queue, workers, result handoff, controller.

pub mod error;
mod pool;
mod queue;
mod result;
mod task;
mod value;
mod worker;

pub use error::{AppResult, PoolError};
pub use pool::{PoolStats, WorkerPool};
pub use result::ResultHandle;
pub use value::TaskOutput;
