//! Owned background tasks.

use tokio::task::JoinHandle;

/// Owns a spawned task and aborts it when dropped.
///
/// Timers that belong to a piece of state are stored as a `TaskGuard` next
/// to that state, so replacing or clearing the state also stops the timer.
#[derive(Debug)]
pub struct TaskGuard {
    task: JoinHandle<()>,
}

impl TaskGuard {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Spawn `future` on the current runtime and guard it.
    pub fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self::new(tokio::spawn(future))
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
