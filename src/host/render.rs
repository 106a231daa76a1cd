//! Text rendering of workflow snapshots.
//!
//! Rendering is a pure function of a snapshot; nothing here touches the
//! workflows.

use crate::batch::BatchView;
use crate::check::CheckView;
use crate::types::{BatchRow, ChainReference};

pub const CHECKING: &str = "Checking...";
pub const WAITING_FOR_MINING: &str = "Waiting for mining...";
pub const COPIED: &str = "Copied!";
const NO_LINK: &str = "—";

/// Lines describing the single-check panel.
///
/// A link is only produced once the reference is mined.
pub fn render_check(view: &CheckView, tx_url_base: &str) -> Vec<String> {
    match view {
        CheckView::Idle => Vec::new(),
        CheckView::Validating | CheckView::Submitting { .. } => vec![CHECKING.to_string()],
        CheckView::Rejected { error } => vec![format!("Error: {error}")],
        CheckView::Failed { txn_id, error } => {
            vec![format!("Transaction: {txn_id}"), format!("Error: {error}")]
        }
        CheckView::Awaiting { txn_id, result }
        | CheckView::Polling { txn_id, result, .. }
        | CheckView::Mined { txn_id, result, .. } => {
            let mut lines = vec![
                format!("Transaction: {txn_id}"),
                format!("Status: {}", result.verdict()),
                format!("Confidence: {}", result.confidence_percent()),
            ];
            match view {
                CheckView::Polling { reference, .. } => {
                    lines.push(format!("Blockchain: {reference} ({WAITING_FOR_MINING})"));
                }
                CheckView::Mined { reference, .. } => {
                    lines.push(format!(
                        "View on Blockchain: {}",
                        explorer_link(reference, tx_url_base)
                    ));
                }
                _ => {}
            }
            lines
        }
    }
}

fn explorer_link(reference: &ChainReference, tx_url_base: &str) -> String {
    match reference.link(tx_url_base) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{tx_url_base}{reference}"),
    }
}

/// Lines of the batch table. Row numbers are 1-based.
pub fn render_batch(view: &BatchView, preview_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if view.submitting {
        lines.push("Analyzing...".to_string());
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if view.rows.is_empty() {
        return lines;
    }

    lines.push(format!(
        "{:>3}  {:<14} {:<14} {:<14} {:<11} {:<9} {}",
        "#", "Transaction", "Sender", "Receiver", "Status", "Hash", "Proof"
    ));
    for (index, row) in view.rows.iter().enumerate() {
        let copied = view.copied_row == Some(index);
        lines.push(render_row(index, row, preview_chars, copied));
    }
    lines
}

fn render_row(index: usize, row: &BatchRow, preview_chars: usize, copied: bool) -> String {
    let mut hash = row.hash_preview(preview_chars);
    if copied {
        hash = format!("{hash} {COPIED}");
    }
    let proof = row
        .blockchain_link
        .as_ref()
        .map(|url| url.to_string())
        .unwrap_or_else(|| NO_LINK.to_string());

    let mut line = format!(
        "{:>3}  {:<14} {:<14} {:<14} {:<11} {:<9} {}",
        index + 1,
        row.transaction_id,
        row.sender_id,
        row.receiver_id,
        row.fraud_status.as_str(),
        hash,
        proof
    );
    if !row.reason.is_empty() {
        line.push_str(&format!("  ({})", row.reason));
    }
    line
}
