//! Chain references: normalized `0x`-prefixed transaction hashes.

use std::fmt;

use url::Url;

const PREFIX: &str = "0x";

/// A blockchain transaction hash, always carrying a single lowercase `0x`
/// prefix. Used as the polling key and the explorer link target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainReference(String);

impl ChainReference {
    /// Normalize a backend-supplied hash.
    ///
    /// Surrounding whitespace is dropped, an existing `0x` or `0X` prefix is
    /// replaced by `0x`, otherwise `0x` is prepended. Returns `None` when
    /// nothing is left to reference. Normalizing an already normalized value
    /// is a no-op.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix(PREFIX)
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return None;
        }
        Some(Self(format!("{PREFIX}{body}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Explorer link for this reference: `tx_url_base` followed by the hash.
    pub fn link(&self, tx_url_base: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{tx_url_base}{}", self.0))
    }
}

impl fmt::Display for ChainReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_prefix_once() {
        let reference = ChainReference::normalize("abc123").unwrap();
        assert_eq!(reference.as_str(), "0xabc123");

        let again = ChainReference::normalize(reference.as_str()).unwrap();
        assert_eq!(again, reference);
    }

    #[test]
    fn test_keeps_existing_prefix() {
        assert_eq!(ChainReference::normalize("0xdeadBEEF").unwrap().as_str(), "0xdeadBEEF");
    }

    #[test]
    fn test_uppercase_prefix_is_lowered() {
        assert_eq!(ChainReference::normalize("0XABC").unwrap().as_str(), "0xABC");
    }

    #[test]
    fn test_empty_values() {
        assert!(ChainReference::normalize("").is_none());
        assert!(ChainReference::normalize("   ").is_none());
        assert!(ChainReference::normalize("0x").is_none());
    }

    #[test]
    fn test_link() {
        let reference = ChainReference::normalize("abc123").unwrap();
        let link = reference.link("https://sepolia.etherscan.io/tx/").unwrap();
        assert_eq!(link.as_str(), "https://sepolia.etherscan.io/tx/0xabc123");
    }
}
