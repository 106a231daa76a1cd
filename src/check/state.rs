//! Observable states of a single-check workflow.

use crate::gateway::GatewayError;
use crate::types::{ChainReference, CheckResult, TransactionId, ValidationError};

/// Snapshot of a `SingleCheckWorkflow`.
///
/// ```text
/// Idle → Validating → Rejected
///                   → Submitting → Failed
///                                → Awaiting                 (no chain reference)
///                                → Polling → Mined          (chain reference)
/// ```
///
/// A new submission restarts from `Validating` whatever the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckView {
    Idle,
    Validating,
    Rejected {
        error: ValidationError,
    },
    Submitting {
        txn_id: TransactionId,
    },
    Failed {
        txn_id: TransactionId,
        error: GatewayError,
    },
    Awaiting {
        txn_id: TransactionId,
        result: CheckResult,
    },
    Polling {
        txn_id: TransactionId,
        result: CheckResult,
        reference: ChainReference,
    },
    Mined {
        txn_id: TransactionId,
        result: CheckResult,
        reference: ChainReference,
    },
}

impl CheckView {
    pub fn name(&self) -> &'static str {
        match self {
            CheckView::Idle => "idle",
            CheckView::Validating => "validating",
            CheckView::Rejected { .. } => "rejected",
            CheckView::Submitting { .. } => "submitting",
            CheckView::Failed { .. } => "failed",
            CheckView::Awaiting { .. } => "awaiting",
            CheckView::Polling { .. } => "polling",
            CheckView::Mined { .. } => "mined",
        }
    }

    /// The current result, if the last submission produced one.
    pub fn result(&self) -> Option<&CheckResult> {
        match self {
            CheckView::Awaiting { result, .. }
            | CheckView::Polling { result, .. }
            | CheckView::Mined { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn reference(&self) -> Option<&ChainReference> {
        match self {
            CheckView::Polling { reference, .. } | CheckView::Mined { reference, .. } => {
                Some(reference)
            }
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, CheckView::Validating | CheckView::Submitting { .. })
    }

    pub fn is_mined(&self) -> bool {
        matches!(self, CheckView::Mined { .. })
    }

    /// The message to show when the last attempt failed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            CheckView::Rejected { error } => Some(error.to_string()),
            CheckView::Failed { error, .. } => Some(error.to_string()),
            _ => None,
        }
    }
}
