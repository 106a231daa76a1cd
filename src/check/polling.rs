//! Confirmation polling sessions.
//!
//! A `PollingSession` owns the background task that re-queries the mining
//! status of one chain reference. The task is held through a `TaskGuard`,
//! so every path that discards or cancels a session also stops its timer.

use crate::lifecycle::TaskGuard;
use crate::types::ChainReference;

/// Public snapshot of a polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub reference: ChainReference,
    pub mined: bool,
    pub active: bool,
}

/// One tracked chain reference and the timer polling it.
#[derive(Debug)]
pub(crate) struct PollingSession {
    pub id: u64,
    pub reference: ChainReference,
    pub mined: bool,
    pub active: bool,
    timer: Option<TaskGuard>,
}

impl PollingSession {
    pub(crate) fn start(id: u64, reference: ChainReference, timer: TaskGuard) -> Self {
        Self {
            id,
            reference,
            mined: false,
            active: true,
            timer: Some(timer),
        }
    }

    /// Stop future ticks and release the timer. Idempotent.
    pub(crate) fn cancel(&mut self) {
        self.active = false;
        self.timer.take();
    }

    pub(crate) fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            reference: self.reference.clone(),
            mined: self.mined,
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::task::tests::settle;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_aborts_timer() {
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let abort = task.abort_handle();
        let reference = ChainReference::normalize("abc").unwrap();

        let mut session = PollingSession::start(1, reference, TaskGuard::new(task));
        assert!(session.active);
        assert!(!session.mined);

        session.cancel();
        assert!(!session.active);
        settle(&abort).await;
        assert!(abort.is_finished());

        // Second cancel is a no-op.
        session.cancel();
        assert!(!session.info().active);
    }
}
