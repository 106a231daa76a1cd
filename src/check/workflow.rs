//! Single transaction check with confirmation polling.
//!
//! # Responsibilities
//! - Validate the identifier before any network call
//! - Submit it and keep exactly one current result
//! - Own at most one polling session for the result's chain reference
//! - Route every session exit (resubmission, mined, teardown) through
//!   `Inner::end_polling`
//!
//! # Ordering
//! All state lives behind one mutex that is never held across an await.
//! A new submission ends the running session before it writes any state of
//! its own. Poll responses are applied only if their session is still the
//! current, active one when the response arrives.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use crate::check::polling::{PollingSession, SessionInfo};
use crate::check::state::CheckView;
use crate::config::ClientConfig;
use crate::gateway::{Gateway, GatewayError, GatewayResult};
use crate::lifecycle::TaskGuard;
use crate::observability::metrics;
use crate::types::{ChainReference, CheckResult, TransactionId, TxnStatus, ValidationError};

/// Errors returned by `SingleCheckWorkflow::submit`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A submission is already in flight.
    #[error("A check is already in progress.")]
    Busy,

    /// The workflow was torn down while the request was in flight.
    #[error("The check was cancelled.")]
    Cancelled,
}

/// Tunables for a `SingleCheckWorkflow`.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub poll_interval: Duration,
    pub dev_mode: bool,
}

impl CheckSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.polling.interval(),
            dev_mode: config.observability.dev_mode,
        }
    }
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(5000),
            dev_mode: false,
        }
    }
}

enum Phase {
    Idle,
    Validating,
    Rejected(ValidationError),
    Submitting(TransactionId),
    Failed(TransactionId, GatewayError),
    Awaiting(TransactionId, CheckResult),
    Polling(TransactionId, CheckResult, PollingSession),
    Mined(TransactionId, CheckResult, PollingSession),
}

impl Phase {
    fn view(&self) -> CheckView {
        match self {
            Phase::Idle => CheckView::Idle,
            Phase::Validating => CheckView::Validating,
            Phase::Rejected(error) => CheckView::Rejected {
                error: error.clone(),
            },
            Phase::Submitting(txn_id) => CheckView::Submitting {
                txn_id: txn_id.clone(),
            },
            Phase::Failed(txn_id, error) => CheckView::Failed {
                txn_id: txn_id.clone(),
                error: error.clone(),
            },
            Phase::Awaiting(txn_id, result) => CheckView::Awaiting {
                txn_id: txn_id.clone(),
                result: result.clone(),
            },
            Phase::Polling(txn_id, result, session) => CheckView::Polling {
                txn_id: txn_id.clone(),
                result: result.clone(),
                reference: session.reference.clone(),
            },
            Phase::Mined(txn_id, result, session) => CheckView::Mined {
                txn_id: txn_id.clone(),
                result: result.clone(),
                reference: session.reference.clone(),
            },
        }
    }
}

struct Inner {
    phase: Phase,
    /// Incremented by every submission; stale responses compare against it.
    attempt: u64,
    next_session_id: u64,
    torn_down: bool,
}

impl Inner {
    /// The single cancellation routine. Stops the running session, if any,
    /// and leaves the phase as `Mined` when `mined` is set, otherwise `Idle`.
    fn end_polling(&mut self, mined: bool, reason: &'static str) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        self.phase = match phase {
            Phase::Polling(txn_id, result, mut session) => {
                session.cancel();
                tracing::debug!(
                    session_id = session.id,
                    reference = %session.reference,
                    reason,
                    "Polling session ended"
                );
                if mined {
                    session.mined = true;
                    Phase::Mined(txn_id, result, session)
                } else {
                    Phase::Idle
                }
            }
            other => other,
        };
    }

    fn current_session(&self) -> Option<&PollingSession> {
        match &self.phase {
            Phase::Polling(_, _, session) | Phase::Mined(_, _, session) => Some(session),
            _ => None,
        }
    }

    fn is_live_session(&self, session_id: u64) -> bool {
        !self.torn_down
            && matches!(&self.phase, Phase::Polling(_, _, s) if s.id == session_id && s.active)
    }
}

struct Shared<G> {
    gateway: Arc<G>,
    settings: CheckSettings,
    inner: Mutex<Inner>,
    updates: watch::Sender<CheckView>,
}

impl<G: Gateway> Shared<G> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.phase.view());
    }

    /// Apply one poll outcome. Returns whether the loop should keep going.
    fn apply_poll(&self, session_id: u64, outcome: GatewayResult<TxnStatus>) -> bool {
        let mut inner = self.lock();
        if !inner.is_live_session(session_id) {
            tracing::debug!(session_id, "Discarding poll response for ended session");
            metrics::record_poll("discarded");
            return false;
        }

        match outcome {
            Ok(status) if status.mined => {
                inner.end_polling(true, "mined");
                self.publish(&inner);
                metrics::record_poll("mined");
                tracing::info!(session_id, block_number = ?status.block_number, "Transaction mined");
                false
            }
            Ok(_) => {
                metrics::record_poll("pending");
                true
            }
            Err(e) => {
                // Polling is advisory: failures never reach the user.
                if self.settings.dev_mode {
                    tracing::debug!(session_id, error = %e, "Ignoring poll failure");
                }
                metrics::record_poll("error");
                true
            }
        }
    }
}

async fn run_poll_loop<G: Gateway>(shared: Arc<Shared<G>>, session_id: u64, reference: ChainReference) {
    let period = shared.settings.poll_interval;
    let Some(start) = Instant::now().checked_add(period) else {
        tracing::warn!(?period, session_id, "Polling interval out of range, not polling");
        return;
    };
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let live = shared.lock().is_live_session(session_id);
        if !live {
            return;
        }
        let outcome = shared.gateway.poll_status(&reference).await;
        if !shared.apply_poll(session_id, outcome) {
            return;
        }
    }
}

/// Puts an abandoned attempt back to `Idle` when a `submit` future is
/// dropped while its gateway call is still outstanding.
struct PendingAttempt<'a, G: Gateway> {
    shared: &'a Shared<G>,
    attempt: u64,
    settled: bool,
}

impl<G: Gateway> Drop for PendingAttempt<'_, G> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.shared.lock();
        if inner.attempt == self.attempt && matches!(inner.phase, Phase::Submitting(_)) {
            inner.phase = Phase::Idle;
            self.shared.publish(&inner);
            tracing::debug!(attempt = self.attempt, "Check abandoned before the backend answered");
        }
    }
}

/// Checks one transaction identifier at a time and tracks the mining status
/// of the resulting chain reference.
///
/// Dropping the workflow tears it down.
pub struct SingleCheckWorkflow<G: Gateway> {
    shared: Arc<Shared<G>>,
}

impl<G: Gateway> SingleCheckWorkflow<G> {
    pub fn new(gateway: Arc<G>, settings: CheckSettings) -> Self {
        let (updates, _) = watch::channel(CheckView::Idle);
        Self {
            shared: Arc::new(Shared {
                gateway,
                settings,
                inner: Mutex::new(Inner {
                    phase: Phase::Idle,
                    attempt: 0,
                    next_session_id: 1,
                    torn_down: false,
                }),
                updates,
            }),
        }
    }

    /// Current state snapshot.
    pub fn view(&self) -> CheckView {
        self.shared.lock().phase.view()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<CheckView> {
        self.shared.updates.subscribe()
    }

    /// The current polling session, active or mined.
    pub fn session(&self) -> Option<SessionInfo> {
        self.shared.lock().current_session().map(PollingSession::info)
    }

    /// Validate and submit a raw identifier.
    ///
    /// Any running polling session is cancelled first. On success the
    /// returned view is `Awaiting` (no chain reference) or `Polling`.
    pub async fn submit(&self, raw: &str) -> Result<CheckView, CheckError> {
        let (attempt, txn_id) = {
            let mut inner = self.shared.lock();
            if inner.torn_down {
                return Err(CheckError::Cancelled);
            }
            if matches!(inner.phase, Phase::Validating | Phase::Submitting(_)) {
                return Err(CheckError::Busy);
            }

            inner.end_polling(false, "resubmitted");
            inner.attempt += 1;
            inner.phase = Phase::Validating;
            self.shared.publish(&inner);

            match TransactionId::parse(raw) {
                Ok(txn_id) => {
                    inner.phase = Phase::Submitting(txn_id.clone());
                    self.shared.publish(&inner);
                    (inner.attempt, txn_id)
                }
                Err(e) => {
                    inner.phase = Phase::Rejected(e.clone());
                    self.shared.publish(&inner);
                    metrics::record_check("rejected");
                    return Err(e.into());
                }
            }
        };

        let mut pending = PendingAttempt {
            shared: &self.shared,
            attempt,
            settled: false,
        };
        let span = tracing::info_span!("check", attempt_id = %Uuid::new_v4(), txn_id = %txn_id);
        let outcome = self
            .shared
            .gateway
            .check_transaction(&txn_id)
            .instrument(span.clone())
            .await;
        pending.settled = true;
        let _entered = span.enter();

        let mut inner = self.shared.lock();
        if inner.torn_down || inner.attempt != attempt {
            tracing::debug!("Discarding check response for superseded attempt");
            return Err(CheckError::Cancelled);
        }

        match outcome {
            Err(e) => {
                tracing::warn!(error = %e, "Check failed");
                metrics::record_check(e.kind());
                inner.phase = Phase::Failed(txn_id, e.clone());
                self.shared.publish(&inner);
                Err(e.into())
            }
            Ok(result) => {
                tracing::info!(fraud = result.fraud, confidence = result.confidence, "Check completed");
                metrics::record_check(if result.fraud { "fraud" } else { "legit" });

                inner.phase = match result.reference() {
                    None => Phase::Awaiting(txn_id, result),
                    Some(reference) => {
                        let session = self.start_polling(&mut inner, reference);
                        Phase::Polling(txn_id, result, session)
                    }
                };
                self.shared.publish(&inner);
                Ok(inner.phase.view())
            }
        }
    }

    fn start_polling(&self, inner: &mut Inner, reference: ChainReference) -> PollingSession {
        let id = inner.next_session_id;
        inner.next_session_id += 1;

        let timer = TaskGuard::spawn(run_poll_loop(
            Arc::clone(&self.shared),
            id,
            reference.clone(),
        ));
        tracing::info!(session_id = id, reference = %reference, "Polling for mining status");
        PollingSession::start(id, reference, timer)
    }

    /// Stop polling and refuse further submissions. Idempotent.
    pub fn teardown(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        inner.end_polling(false, "teardown");
        inner.torn_down = true;
        inner.phase = Phase::Idle;
        self.shared.publish(&inner);
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }
}

impl<G: Gateway> Drop for SingleCheckWorkflow<G> {
    fn drop(&mut self) {
        self.teardown();
    }
}
