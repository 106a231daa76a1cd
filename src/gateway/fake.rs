//! Scripted in-memory gateway for workflow tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::gateway::{Gateway, GatewayResult};
use crate::types::{BatchFile, ChainReference, CheckResult, TransactionId, TxnStatus, UploadResponse};

/// Responses are served in push order. An empty poll queue answers
/// "not mined yet"; empty check/upload queues answer a rejection.
#[derive(Default)]
pub(crate) struct FakeGateway {
    checks: Mutex<VecDeque<GatewayResult<CheckResult>>>,
    polls: Mutex<VecDeque<GatewayResult<TxnStatus>>>,
    uploads: Mutex<VecDeque<GatewayResult<UploadResponse>>>,
    polled: Mutex<Vec<ChainReference>>,
    check_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    check_delay: Duration,
    poll_delay: Duration,
    upload_delay: Duration,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose calls take the given (virtual) time to answer.
    pub fn with_delays(check: Duration, poll: Duration, upload: Duration) -> Self {
        Self {
            check_delay: check,
            poll_delay: poll,
            upload_delay: upload,
            ..Self::default()
        }
    }

    pub fn push_check(&self, response: GatewayResult<CheckResult>) {
        self.checks.lock().unwrap().push_back(response);
    }

    pub fn push_poll(&self, response: GatewayResult<TxnStatus>) {
        self.polls.lock().unwrap().push_back(response);
    }

    pub fn push_upload(&self, response: GatewayResult<UploadResponse>) {
        self.uploads.lock().unwrap().push_back(response);
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.polled.lock().unwrap().len()
    }

    pub fn poll_calls_for(&self, reference: &str) -> usize {
        self.polled
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == reference)
            .count()
    }

    fn rejected() -> crate::gateway::GatewayError {
        crate::gateway::GatewayError::BackendRejected {
            status: 500,
            message: "unscripted call".to_string(),
        }
    }
}

pub(crate) fn pending() -> GatewayResult<TxnStatus> {
    Ok(TxnStatus {
        mined: false,
        block_number: None,
    })
}

pub(crate) fn mined() -> GatewayResult<TxnStatus> {
    Ok(TxnStatus {
        mined: true,
        block_number: Some(7),
    })
}

pub(crate) fn verdict(fraud: bool, confidence: f64, hash: Option<&str>) -> GatewayResult<CheckResult> {
    Ok(CheckResult {
        fraud,
        confidence,
        blockchain_tx_hash: hash.map(str::to_string),
    })
}

impl Gateway for FakeGateway {
    async fn check_transaction(&self, _id: &TransactionId) -> GatewayResult<CheckResult> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        let next = self.checks.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::rejected()))
    }

    async fn upload_batch(&self, _file: &BatchFile) -> GatewayResult<UploadResponse> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if !self.upload_delay.is_zero() {
            tokio::time::sleep(self.upload_delay).await;
        }
        let next = self.uploads.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(Self::rejected()))
    }

    async fn poll_status(&self, reference: &ChainReference) -> GatewayResult<TxnStatus> {
        self.polled.lock().unwrap().push(reference.clone());
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        let next = self.polls.lock().unwrap().pop_front();
        next.unwrap_or_else(pending)
    }
}
