//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mule_trace_checks_total` (counter): single checks by outcome
//! - `mule_trace_polls_total` (counter): status polls by outcome
//! - `mule_trace_batches_total` (counter): batch uploads by outcome
//! - `mule_trace_batch_rows` (gauge): rows in the current batch result
//!
//! Without an installed recorder these calls are no-ops.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_check(outcome: &'static str) {
    counter!("mule_trace_checks_total", "outcome" => outcome).increment(1);
}

pub fn record_poll(outcome: &'static str) {
    counter!("mule_trace_polls_total", "outcome" => outcome).increment(1);
}

pub fn record_batch(outcome: &'static str) {
    counter!("mule_trace_batches_total", "outcome" => outcome).increment(1);
}

pub fn record_batch_rows(rows: usize) {
    gauge!("mule_trace_batch_rows").set(rows as f64);
}
