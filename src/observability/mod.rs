//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway + workflows produce:
//!     → logging.rs (structured log events, dev-mode diagnostics)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr
//!     → Prometheus scrape endpoint (console mode, optional)
//! ```

pub mod logging;
pub mod metrics;
