//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: URLs parse, durations
//! are non-zero, batch display settings are usable. All errors are
//! returned, not just the first.

use std::fmt;

use crate::config::schema::ClientConfig;

/// Longest accepted polling interval: one day.
pub const MAX_POLL_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.backend.base_url) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::new("backend.base_url", "must be a base URL"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }

    if let Err(e) = url::Url::parse(&config.explorer.tx_url_base) {
        errors.push(ValidationError::new("explorer.tx_url_base", e.to_string()));
    }

    if config.backend.submit_timeout_secs == 0 {
        errors.push(ValidationError::new("backend.submit_timeout_secs", "must be > 0"));
    }
    if config.backend.poll_timeout_secs == 0 {
        errors.push(ValidationError::new("backend.poll_timeout_secs", "must be > 0"));
    }
    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new("polling.interval_ms", "must be > 0"));
    } else if config.polling.interval_ms > MAX_POLL_INTERVAL_MS {
        errors.push(ValidationError::new(
            "polling.interval_ms",
            format!("must be <= {MAX_POLL_INTERVAL_MS}"),
        ));
    }
    if config.batch.copy_indicator_ms == 0 {
        errors.push(ValidationError::new("batch.copy_indicator_ms", "must be > 0"));
    }
    if config.batch.hash_preview_chars == 0 {
        errors.push(ValidationError::new("batch.hash_preview_chars", "must be > 0"));
    }
    if let Some(command) = &config.batch.clipboard_command {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            errors.push(ValidationError::new(
                "batch.clipboard_command",
                "must name a program",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "not a url".to_string();
        config.polling.interval_ms = 0;
        config.batch.clipboard_command = Some(Vec::new());

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["backend.base_url", "polling.interval_ms", "batch.clipboard_command"]
        );
    }

    #[test]
    fn test_rejects_oversized_poll_interval() {
        let mut config = ClientConfig::default();
        config.polling.interval_ms = u64::MAX;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "polling.interval_ms");

        config.polling.interval_ms = MAX_POLL_INTERVAL_MS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_non_base_url() {
        let mut config = ClientConfig::default();
        config.backend.base_url = "mailto:ops@example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "backend.base_url");
    }
}
