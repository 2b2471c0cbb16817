//! The queued unit of work.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::core::result::ResultSlot;
use crate::core::value::TaskOutput;

/// A user closure bound to the result slot it must publish to.
///
/// Built inside `submit` before the task becomes visible to any worker, so
/// binding never races with execution. The task and the submitter's handle
/// each hold an `Arc` of the slot; the slot therefore outlives the run.
pub(crate) struct PoolTask {
    job: Box<dyn FnOnce() -> TaskOutput + Send>,
    slot: Arc<ResultSlot>,
}

impl PoolTask {
    pub(crate) fn new(job: Box<dyn FnOnce() -> TaskOutput + Send>, slot: Arc<ResultSlot>) -> Self {
        Self { job, slot }
    }

    /// Run the user closure and publish its output.
    ///
    /// A panicking closure publishes the empty sentinel instead, so the
    /// submitter unblocks and the worker survives.
    pub(crate) fn exec(self) {
        let output = match panic::catch_unwind(AssertUnwindSafe(self.job)) {
            Ok(output) => output,
            Err(_) => {
                warn!("task panicked; publishing empty output");
                TaskOutput::empty()
            }
        };
        self.slot.publish(output);
    }
}

impl std::fmt::Debug for PoolTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolTask").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::ResultHandle;

    #[test]
    fn exec_publishes_output() {
        let slot = Arc::new(ResultSlot::new(true));
        let task = PoolTask::new(Box::new(|| TaskOutput::new(6 * 7)), Arc::clone(&slot));
        task.exec();
        let handle = ResultHandle::new(slot);
        assert_eq!(handle.get().downcast::<i32>().unwrap(), 42);
    }

    #[test]
    fn panic_publishes_empty() {
        let slot = Arc::new(ResultSlot::new(true));
        let task = PoolTask::new(Box::new(|| panic!("user bug")), Arc::clone(&slot));
        task.exec();
        let handle = ResultHandle::new(slot);
        assert!(handle.get().is_empty());
    }
}
