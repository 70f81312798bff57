//! Task scheduler for delayed and repeating work
//!
//! Every timer in the console (notification expiry, status polling) is
//! scheduled here so it can be cancelled through a handle. Timers run on
//! tokio's clock, so tests can drive them with paused virtual time.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Default)]
struct SchedulerInner {
    next_id: AtomicU64,
    tasks: Mutex<HashMap<u64, AbortHandle>>,
}

impl SchedulerInner {
    fn forget(&self, id: u64) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.remove(&id);
    }
}

/// Owner of all timer-driven tasks
///
/// Clones share the same task table. Tasks run on the current tokio runtime;
/// scheduling outside one logs a warning and the task never fires.
#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay`
    pub fn schedule_after<F>(&self, delay: Duration, task: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);

        // Hold the table lock across spawn so the task cannot forget itself
        // before its handle is registered.
        let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(abort) = spawn_on_runtime(async move {
            tokio::time::sleep(delay).await;
            inner.forget(id);
            task();
        }) {
            tasks.insert(id, abort);
        }

        TaskHandle(id)
    }

    /// Run `task` every `period`, first after one full period
    pub fn schedule_every<F, Fut>(&self, period: Duration, task: F) -> TaskHandle
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(abort) = spawn_on_runtime(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task().await;
            }
        }) {
            tasks.insert(id, abort);
        }

        TaskHandle(id)
    }

    /// Cancel a task; returns false if it already ran or was cancelled
    pub fn cancel(&self, handle: TaskHandle) -> bool {
        let removed = {
            let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.remove(&handle.0)
        };
        match removed {
            Some(abort) => {
                abort.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending task
    pub fn cancel_all(&self) {
        let drained: Vec<AbortHandle> = {
            let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
            tasks.drain().map(|(_, abort)| abort).collect()
        };
        for abort in drained {
            abort.abort();
        }
    }

    /// Number of tasks that have not yet fired or been cancelled
    pub fn pending(&self) -> usize {
        let tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.len()
    }
}

fn spawn_on_runtime<F>(future: F) -> Option<AbortHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => Some(runtime.spawn(future).abort_handle()),
        Err(e) => {
            tracing::warn!("Cannot schedule task outside a tokio runtime: {}", e);
            None
        }
    }
}
