//! One-shot result handoff between a worker and the submitter.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::core::value::TaskOutput;

/// Shared slot behind a [`ResultHandle`].
///
/// The slot is written at most once by the worker that ran the task and read
/// at most once by the submitter. Its own mutex/condvar pair provides the
/// happens-before edge from `publish` to `get`; it never participates in the
/// pool lock.
pub(crate) struct ResultSlot {
    value: Mutex<Option<TaskOutput>>,
    ready: Condvar,
    valid: bool,
}

impl std::fmt::Debug for ResultSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSlot")
            .field("valid", &self.valid)
            .finish_non_exhaustive()
    }
}

impl ResultSlot {
    pub(crate) fn new(valid: bool) -> Self {
        Self {
            value: Mutex::new(None),
            ready: Condvar::new(),
            valid,
        }
    }

    /// Store the task output and wake the waiting submitter.
    ///
    /// Writes to an invalid slot are ignored; no submitter will ever read one.
    pub(crate) fn publish(&self, output: TaskOutput) {
        if !self.valid {
            return;
        }
        let mut value = self.value.lock();
        if value.is_none() {
            *value = Some(output);
            self.ready.notify_all();
        }
    }

    fn take_blocking(&self) -> TaskOutput {
        let mut value = self.value.lock();
        loop {
            if let Some(output) = value.take() {
                return output;
            }
            self.ready.wait(&mut value);
        }
    }
}

/// Handle to the result of one submitted task.
///
/// Returned by [`WorkerPool::submit`](crate::WorkerPool::submit). Calling
/// [`get`](ResultHandle::get) blocks until the task has run and published its
/// output. A handle whose submission overflowed the queue is **invalid**:
/// `get` returns the empty output immediately without blocking.
///
/// # Example
///
/// ```rust,no_run
/// use flexpool::WorkerPool;
///
/// let pool = WorkerPool::new();
/// pool.start()?;
/// let handle = pool.submit(|| 21 * 2)?;
/// assert_eq!(handle.get().downcast::<i32>()?, 42);
/// # Ok::<(), flexpool::PoolError>(())
/// ```
pub struct ResultHandle {
    slot: Arc<ResultSlot>,
}

impl std::fmt::Debug for ResultHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultHandle")
            .field("valid", &self.slot.valid)
            .finish_non_exhaustive()
    }
}

impl ResultHandle {
    pub(crate) fn new(slot: Arc<ResultSlot>) -> Self {
        Self { slot }
    }

    /// Create the handle for a submission the queue rejected.
    pub(crate) fn invalid() -> Self {
        Self {
            slot: Arc::new(ResultSlot::new(false)),
        }
    }

    /// False if the submission overflowed the queue; `get` on an invalid
    /// handle returns the empty output without blocking.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.slot.valid
    }

    /// Block until the task publishes its output, then return it.
    ///
    /// The handle is consumed: one handle, one delivery. On an invalid
    /// handle this returns [`TaskOutput::empty`] immediately.
    #[must_use]
    pub fn get(self) -> TaskOutput {
        if !self.slot.valid {
            return TaskOutput::empty();
        }
        self.slot.take_blocking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn publish_then_get() {
        let slot = Arc::new(ResultSlot::new(true));
        slot.publish(TaskOutput::new(5_u8));
        let handle = ResultHandle::new(slot);
        assert!(handle.is_valid());
        assert_eq!(handle.get().downcast::<u8>().unwrap(), 5);
    }

    #[test]
    fn get_blocks_until_publish() {
        let slot = Arc::new(ResultSlot::new(true));
        let writer = Arc::clone(&slot);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            writer.publish(TaskOutput::new("done".to_string()));
        });
        let handle = ResultHandle::new(slot);
        assert_eq!(handle.get().downcast::<String>().unwrap(), "done");
    }

    #[test]
    fn invalid_handle_returns_empty_immediately() {
        let handle = ResultHandle::invalid();
        assert!(!handle.is_valid());
        let start = std::time::Instant::now();
        assert!(handle.get().is_empty());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn publish_to_invalid_slot_is_noop() {
        let slot = Arc::new(ResultSlot::new(false));
        slot.publish(TaskOutput::new(1_i32));
        assert!(slot.value.lock().is_none());
    }

    #[test]
    fn second_publish_is_ignored() {
        let slot = Arc::new(ResultSlot::new(true));
        slot.publish(TaskOutput::new(1_i32));
        slot.publish(TaskOutput::new(2_i32));
        let handle = ResultHandle::new(slot);
        assert_eq!(handle.get().downcast::<i32>().unwrap(), 1);
    }
}
