//! Mule-trace client library.
//!
//! Talks to a fraud-analysis backend: single transaction checks with
//! blockchain confirmation polling, and batch CSV analysis.

pub mod batch;
pub mod check;
pub mod config;
pub mod gateway;
pub mod host;
pub mod lifecycle;
pub mod observability;
pub mod types;

pub use config::ClientConfig;
pub use gateway::HttpGateway;
pub use host::WorkflowHost;
pub use lifecycle::Shutdown;
