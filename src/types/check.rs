//! Single-check result types.

use serde::{Deserialize, Serialize};

use crate::types::chain::ChainReference;

/// Verdict returned by `POST /check_txn`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckResult {
    pub fraud: bool,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
}

impl CheckResult {
    /// The normalized chain reference, if the backend logged one.
    pub fn reference(&self) -> Option<ChainReference> {
        self.blockchain_tx_hash
            .as_deref()
            .and_then(ChainReference::normalize)
    }

    /// Confidence as a percentage with two decimals, e.g. `"97.00%"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }

    pub fn verdict(&self) -> &'static str {
        if self.fraud {
            "Fraudulent"
        } else {
            "Legitimate"
        }
    }
}

/// Mining status returned by `GET /txn_status/{hash}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TxnStatus {
    pub mined: bool,
    #[serde(default, rename = "blockNumber")]
    pub block_number: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckRequest<'a> {
    pub txn_id: &'a str,
}
