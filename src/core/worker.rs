//! Worker loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PoolMode;
use crate::core::pool::Shared;

/// How long a cached-mode worker waits on `not_empty` before re-checking its
/// idle clock.
const IDLE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Long-running consumer loop, one per worker thread.
///
/// The loop tries to pop a task first and inspects `running` only when the
/// queue is empty, which is what makes shutdown drain the queue: everything
/// enqueued before the flag flipped still gets executed.
pub(crate) fn worker_loop(shared: Arc<Shared>, worker_id: u32) {
    debug!(worker_id, "worker started");
    let mut last_active = Instant::now();

    loop {
        let task = {
            let mut state = shared.state.lock();
            let task = loop {
                if let Some(task) = state.queue.pop() {
                    break task;
                }
                if !state.running {
                    state.deregister(worker_id);
                    shared.drained.notify_all();
                    debug!(worker_id, "worker exiting on shutdown");
                    return;
                }
                match state.config.mode {
                    PoolMode::Cached => {
                        let timed_out = shared
                            .not_empty
                            .wait_for(&mut state, IDLE_POLL_INTERVAL)
                            .timed_out();
                        // Surplus workers retire after idling past the limit;
                        // the population never drops below initial_workers.
                        if timed_out
                            && last_active.elapsed() >= state.config.idle_limit()
                            && state.current_workers > state.initial_workers
                        {
                            state.deregister(worker_id);
                            // Every self-erase signals the drain condition: a
                            // retire that races shutdown must still wake the
                            // thread waiting for the registry to empty.
                            shared.drained.notify_all();
                            debug!(
                                worker_id,
                                current_workers = state.current_workers,
                                "idle worker retired"
                            );
                            return;
                        }
                    }
                    PoolMode::Fixed => {
                        shared.not_empty.wait(&mut state);
                    }
                }
            };

            state.idle_workers -= 1;
            // Pass the wakeup along if work remains, and let blocked
            // submitters know a slot freed up.
            if !state.queue.is_empty() {
                shared.not_empty.notify_all();
            }
            shared.not_full.notify_all();
            task
        };

        task.exec();

        shared.state.lock().idle_workers += 1;
        last_active = Instant::now();
    }
}
