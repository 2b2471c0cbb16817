//! # flexpool
//!
//! A worker pool that executes submitted closures concurrently on a bounded
//! set of worker threads and hands each return value back through a one-shot
//! [`ResultHandle`].
//!
//! Two operating modes:
//!
//! - [`PoolMode::Fixed`] — the worker count is constant from `start` to
//!   shutdown.
//! - [`PoolMode::Cached`] — the pool grows on backlog up to `max_workers`
//!   and shrinks back to `initial_workers` once surplus workers idle past
//!   the configured limit.
//!
//! Submission is back-pressured: when the bounded queue stays full for the
//! submit wait (default one second), `submit` returns an invalid handle
//! instead of blocking forever. Dropping the pool drains the queue — every
//! accepted task completes before the drop returns, and no worker is leaked.
//!
//! ## Example
//!
//! ```
//! use flexpool::{PoolConfig, PoolMode, WorkerPool};
//!
//! let pool = WorkerPool::with_config(
//!     PoolConfig::new()
//!         .with_mode(PoolMode::Cached)
//!         .with_initial_workers(2)
//!         .with_max_workers(8),
//! );
//! pool.start()?;
//!
//! let handles: Vec<_> = (0..4u64)
//!     .map(|i| pool.submit(move || i * i))
//!     .collect::<Result<_, _>>()?;
//!
//! let mut squares: Vec<u64> = handles
//!     .into_iter()
//!     .map(|h| h.get().downcast::<u64>())
//!     .collect::<Result<_, _>>()?;
//! squares.sort_unstable();
//! assert_eq!(squares, vec![0, 1, 4, 9]);
//! # Ok::<(), flexpool::PoolError>(())
//! ```
//!
//! Results are type-erased in flight: a task may return any `Send + 'static`
//! value, and the caller recovers it with [`TaskOutput::downcast`], which
//! fails with [`PoolError::TypeMismatch`] on disagreement.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod util;

pub use self::config::{PoolConfig, PoolMode};
pub use self::core::{AppResult, PoolError, PoolStats, ResultHandle, TaskOutput, WorkerPool};
