//! Login gate in front of the workflows.
//!
//! This is a UI toggle, not a security boundary: credentials are compared
//! against the `[auth]` config section in plain text.

use crate::config::AuthConfig;

/// Failed login message shown to the operator.
pub const LOGIN_FAILED: &str = "Incorrect username or password.";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> bool;
}

/// Accepts exactly the configured username/password pair.
#[derive(Debug, Clone)]
pub struct ConfiguredCredentials {
    expected: Credentials,
}

impl ConfiguredCredentials {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            expected: Credentials::new(&config.username, &config.password),
        }
    }
}

impl Authenticator for ConfiguredCredentials {
    fn authenticate(&self, credentials: &Credentials) -> bool {
        *credentials == self.expected
    }
}
