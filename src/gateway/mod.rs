//! Request gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Workflow operation
//!     → client.rs (build request, attach deadline)
//!     → backend scoring service
//!     → client.rs (status check, decode body)
//!     → typed result | GatewayError (types.rs)
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline: submission-class calls use the long
//!   submit timeout, status polls the short poll timeout
//! - No automatic retries; the polling loop is the only repeating caller
//! - Diagnostics are emitted only when development mode is on

pub mod client;
pub mod types;

pub use client::{Gateway, HttpGateway};
pub use types::{GatewayError, GatewayResult};

#[cfg(test)]
pub(crate) mod fake;
