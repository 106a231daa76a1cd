//! Transaction identifiers and local validation errors.

use std::fmt;

use thiserror::Error;

/// Errors caught locally, before anything reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ID must start with 'C' or 'M' followed by numbers.")]
    InvalidTransactionId,

    #[error("No file provided. Please upload a CSV file.")]
    NoFileProvided,
}

/// A validated transaction identifier: `C` (customer) or `M` (merchant)
/// followed by one or more ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Validate a raw identifier. The input is taken verbatim; surrounding
    /// whitespace makes it invalid.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let mut chars = raw.chars();
        let tagged = matches!(chars.next(), Some('C' | 'M'));
        let digits = chars.as_str();

        if tagged && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationError::InvalidTransactionId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        for raw in ["C1231006815", "M9", "C0"] {
            let id = TransactionId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn test_invalid_ids() {
        for raw in ["", "C", "M", "X123", "c123", "C12a", " C123", "C123 ", "CM12", "C-1", "C١٢"] {
            assert_eq!(
                TransactionId::parse(raw),
                Err(ValidationError::InvalidTransactionId),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::InvalidTransactionId.to_string(),
            "ID must start with 'C' or 'M' followed by numbers."
        );
        assert_eq!(
            ValidationError::NoFileProvided.to_string(),
            "No file provided. Please upload a CSV file."
        );
    }
}
