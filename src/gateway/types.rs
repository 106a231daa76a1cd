//! Gateway error taxonomy.

use serde::Deserialize;
use thiserror::Error;

/// Failures of an outbound call, classified for display.
///
/// The `Display` text is what the operator sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The call exceeded its deadline.
    #[error("Request took too long. Please try again.")]
    Timeout,

    /// No response was received (connect failure, reset, DNS, ...).
    #[error("Network connection failed. Please check your internet.")]
    NetworkUnreachable,

    /// The backend answered with a non-success status.
    #[error("{message}")]
    BackendRejected { status: u16, message: String },

    /// A success status with a body that does not decode.
    #[error("Unexpected response from backend: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Timeout => "timeout",
            GatewayError::NetworkUnreachable => "network",
            GatewayError::BackendRejected { .. } => "rejected",
            GatewayError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::InvalidResponse(err.to_string())
        } else {
            GatewayError::NetworkUnreachable
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error body shape used by the backend: `{ "error": "..." }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

pub(crate) const DEFAULT_REJECTION: &str = "Request failed";
