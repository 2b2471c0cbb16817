//! Tracing setup for pool diagnostics.

use tracing_subscriber::EnvFilter;

/// Fallback filter when `RUST_LOG` is unset: pool lifecycle events only.
const DEFAULT_FILTER: &str = "flexpool=info";

/// Install an env-filtered `fmt` subscriber if none is set.
///
/// Worker spawn/retire and queue overflow events are emitted through
/// `tracing`; embedding programs that already install their own subscriber
/// see them without calling this. With no subscriber installed, call it once
/// before `start` — `RUST_LOG=flexpool=debug` surfaces the per-worker
/// lifecycle, and the default keeps only pool start/shutdown and overflow
/// warnings.
///
/// ```
/// use flexpool::{util::init_tracing, WorkerPool};
///
/// init_tracing();
/// let pool = WorkerPool::new();
/// pool.start()?;
/// # Ok::<(), flexpool::PoolError>(())
/// ```
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
