//! Debounce timer with a single pending slot.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs a task after a delay; scheduling again replaces the pending task
pub struct CancellableTimer {
    delay: Duration,
    runtime: Option<Handle>,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl CancellableTimer {
    /// Create a timer that fires `delay` after each schedule
    ///
    /// Tasks run on the tokio runtime current at construction. Built outside
    /// a runtime, the timer drops every task it is given.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            runtime: Handle::try_current().ok(),
            slot: Mutex::new(None),
        }
    }

    /// Create a timer whose tasks run on `runtime`
    pub fn with_runtime(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime: Some(runtime),
            slot: Mutex::new(None),
        }
    }

    /// Configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` after the delay, aborting whatever was pending
    ///
    /// A replaced task is aborted even if its delay already elapsed and it is
    /// running.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some(runtime) = &self.runtime else {
            tracing::warn!("No tokio runtime, debounced task dropped");
            return;
        };
        let delay = self.delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        if let Some(previous) = self.slot.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Abort the pending task. Returns true if one was still pending.
    pub fn cancel(&self) -> bool {
        match self.slot.lock().take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Whether a scheduled task has not finished yet
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for CancellableTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellableTimer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
