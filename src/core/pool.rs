//! Pool controller: submission surface, lifecycle, and shutdown.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::config::{PoolConfig, PoolMode};
use crate::core::error::PoolError;
use crate::core::queue::BoundedQueue;
use crate::core::result::{ResultHandle, ResultSlot};
use crate::core::task::PoolTask;
use crate::core::value::TaskOutput;
use crate::core::worker::worker_loop;

/// State guarded by the pool mutex.
///
/// Queue, registry, counters, the running flag, and the configuration form a
/// single consistency domain: a worker holding the lock sees all of them at
/// one instant, and there is no second lock-order axis.
pub(crate) struct PoolState {
    pub(crate) config: PoolConfig,
    pub(crate) queue: BoundedQueue<PoolTask>,
    pub(crate) registry: HashMap<u32, Thread>,
    pub(crate) running: bool,
    pub(crate) initial_workers: usize,
    pub(crate) current_workers: usize,
    pub(crate) idle_workers: usize,
    next_worker_id: u32,
}

impl PoolState {
    /// Remove a worker from the registry and the population counters.
    ///
    /// Called by the worker itself, under the pool mutex, on both exit paths
    /// (idle-retire and shutdown).
    pub(crate) fn deregister(&mut self, worker_id: u32) {
        self.registry.remove(&worker_id);
        self.current_workers = self.current_workers.saturating_sub(1);
        self.idle_workers = self.idle_workers.saturating_sub(1);
    }
}

/// Shared block: the pool mutex plus the three condition variables on it.
pub(crate) struct Shared {
    pub(crate) state: Mutex<PoolState>,
    /// Signalled after a dequeue frees a queue slot.
    pub(crate) not_full: Condvar,
    /// Signalled after an enqueue and on shutdown.
    pub(crate) not_empty: Condvar,
    /// Signalled when a worker erases itself from the registry.
    pub(crate) drained: Condvar,
}

/// Snapshot of pool utilization, read under the pool mutex.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Whether `start` has been called and the pool has not shut down.
    pub running: bool,
    /// Operating mode.
    pub mode: PoolMode,
    /// Living workers.
    pub current_workers: usize,
    /// Workers waiting for a task.
    pub idle_workers: usize,
    /// Tasks accepted but not yet dequeued.
    pub pending_tasks: usize,
    /// Queue capacity threshold.
    pub queue_capacity: usize,
}

/// A worker pool executing submitted closures on a bounded set of threads.
///
/// In [`PoolMode::Fixed`] the worker count is constant from [`start`] to
/// shutdown. In [`PoolMode::Cached`] the pool grows one worker at a time
/// while the backlog exceeds the idle count, up to `max_workers`, and surplus
/// workers retire after idling past `idle_limit`.
///
/// Dropping the pool shuts it down gracefully: every task accepted into the
/// queue before the drop runs to completion and no worker is leaked.
///
/// # Example
///
/// ```rust
/// use flexpool::{PoolConfig, WorkerPool};
///
/// let pool = WorkerPool::with_config(PoolConfig::new().with_initial_workers(2));
/// pool.start()?;
///
/// let handle = pool.submit(|| (1..=100u64).sum::<u64>())?;
/// assert_eq!(handle.get().downcast::<u64>()?, 5050);
/// # Ok::<(), flexpool::PoolError>(())
/// ```
///
/// [`start`]: WorkerPool::start
pub struct WorkerPool {
    shared: Arc<Shared>,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerPool {
    /// Create an unstarted pool with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create an unstarted pool from a configuration.
    #[must_use]
    pub fn with_config(config: PoolConfig) -> Self {
        let queue = BoundedQueue::new(config.queue_capacity);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PoolState {
                    config,
                    queue,
                    registry: HashMap::new(),
                    running: false,
                    initial_workers: 0,
                    current_workers: 0,
                    idle_workers: 0,
                    next_worker_id: 0,
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                drained: Condvar::new(),
            }),
        }
    }

    /// Set the operating mode. No-op once the pool is running.
    pub fn set_mode(&self, mode: PoolMode) {
        let mut state = self.shared.state.lock();
        if state.running {
            return;
        }
        state.config.mode = mode;
    }

    /// Set the task queue capacity. No-op once the pool is running.
    pub fn set_queue_capacity(&self, capacity: usize) {
        let mut state = self.shared.state.lock();
        if state.running {
            return;
        }
        state.config.queue_capacity = capacity;
    }

    /// Set the cached-mode worker ceiling. No-op once the pool is running.
    pub fn set_max_workers(&self, count: usize) {
        let mut state = self.shared.state.lock();
        if state.running {
            return;
        }
        state.config.max_workers = count;
    }

    /// Set the number of workers `start` spawns. No-op once the pool is
    /// running.
    pub fn set_initial_workers(&self, count: usize) {
        let mut state = self.shared.state.lock();
        if state.running {
            return;
        }
        state.config.initial_workers = count;
    }

    /// True between `start` and shutdown.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Snapshot current utilization.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            running: state.running,
            mode: state.config.mode,
            current_workers: state.current_workers,
            idle_workers: state.idle_workers,
            pending_tasks: state.queue.len(),
            queue_capacity: state.queue.capacity(),
        }
    }

    /// Start the pool, spawning `initial_workers` workers.
    ///
    /// Calling `start` on a running pool is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn start(&self) -> Result<(), PoolError> {
        let mut state = self.shared.state.lock();
        if state.running {
            return Ok(());
        }
        state.config.validate().map_err(PoolError::InvalidConfig)?;

        let queue_capacity = state.config.queue_capacity;
        state.queue.set_capacity(queue_capacity);
        state.running = true;
        state.initial_workers = state.config.initial_workers;
        for _ in 0..state.initial_workers {
            Self::spawn_worker(&self.shared, &mut state);
        }

        info!(
            mode = ?state.config.mode,
            initial_workers = state.initial_workers,
            queue_capacity = state.config.queue_capacity,
            "worker pool started"
        );
        Ok(())
    }

    /// Submit a closure for execution and receive a [`ResultHandle`] for its
    /// return value.
    ///
    /// If the queue stays full for the configured submit wait (default one
    /// second), the returned handle is **invalid**: `is_valid()` is false and
    /// `get()` yields the empty output immediately. Overflow is a
    /// back-pressure signal; whether to retry is the caller's decision.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotRunning`] if `start` has not been called.
    pub fn submit<F, T>(&self, job: F) -> Result<ResultHandle, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::new(ResultSlot::new(true));
        let task = PoolTask::new(Box::new(move || TaskOutput::new(job())), Arc::clone(&slot));

        let mut state = self.shared.state.lock();
        if !state.running {
            return Err(PoolError::NotRunning);
        }

        let deadline = Instant::now() + state.config.submit_wait();
        while !state.queue.has_space() {
            let timed_out = self
                .shared
                .not_full
                .wait_until(&mut state, deadline)
                .timed_out();
            if timed_out {
                if state.queue.has_space() {
                    break;
                }
                warn!(
                    pending = state.queue.len(),
                    capacity = state.queue.capacity(),
                    "task queue is full, submission rejected"
                );
                return Ok(ResultHandle::invalid());
            }
        }

        state.queue.push(task);
        self.shared.not_empty.notify_all();

        if state.config.mode == PoolMode::Cached
            && state.queue.len() > state.idle_workers
            && state.current_workers < state.config.max_workers
        {
            let worker_id = Self::spawn_worker(&self.shared, &mut state);
            debug!(
                worker_id,
                current_workers = state.current_workers,
                pending = state.queue.len(),
                "spawned worker on backlog"
            );
        }

        Ok(ResultHandle::new(slot))
    }

    /// Spawn one worker and register it. Caller holds the pool mutex, so the
    /// registry contains the worker before any thread can observe it.
    fn spawn_worker(shared: &Arc<Shared>, state: &mut PoolState) -> u32 {
        let worker_id = state.next_worker_id;
        state.next_worker_id += 1;

        let loop_shared = Arc::clone(shared);
        let handle = thread::Builder::new()
            .name(format!("flexpool-worker-{worker_id}"))
            .spawn(move || worker_loop(loop_shared, worker_id))
            .expect("failed to spawn worker thread");

        state.registry.insert(worker_id, handle.thread().clone());
        state.current_workers += 1;
        state.idle_workers += 1;
        worker_id
    }
}

impl Drop for WorkerPool {
    /// Graceful drain: wake every idle worker, then wait until the registry
    /// empties. Workers observe the cleared flag only when the queue is
    /// empty, so tasks accepted before the drop all run to completion.
    fn drop(&mut self) {
        let mut state = self.shared.state.lock();
        if !state.running {
            return;
        }
        state.running = false;
        // The flag write and the broadcast must both happen under the lock:
        // otherwise a worker could re-read `running == true`, then enter an
        // untimed wait after our notify and miss the shutdown forever.
        self.shared.not_empty.notify_all();
        while !state.registry.is_empty() {
            self.shared.drained.wait(&mut state);
        }
        info!("worker pool shut down");
    }
}
