//! Error types for pool operations.

use thiserror::Error;

/// Errors produced by the worker pool.
///
/// Queue overflow is not an error: `submit` reports it in-band through an
/// invalid [`ResultHandle`](crate::ResultHandle) so the task's lifetime
/// contract holds.
#[derive(Debug, Error)]
pub enum PoolError {
    /// `submit` was called before `start`.
    #[error("pool is not running")]
    NotRunning,
    /// A task output was extracted as a different type than the task produced.
    #[error("output type mismatch: expected {expected}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: &'static str,
    },
    /// The output slot holds no value (invalid handle or panicked task).
    #[error("task produced no output")]
    EmptyResult,
    /// Configuration validation failed at `start`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
