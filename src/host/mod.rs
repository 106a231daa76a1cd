//! Workflow host: the operator-facing composition of both workflows.
//!
//! # Data Flow
//! ```text
//! console line
//!     → console.rs (parse command)
//!     → WorkflowHost (login gate)
//!         → SingleCheckWorkflow ─┐
//!         → BatchWorkflow ───────┴─ share only the gateway
//!     → render.rs (snapshot → lines)
//! ```
//!
//! # Design Decisions
//! - The workflows exist only while logged in; logout drops them, which
//!   tears both down
//! - Neither workflow holds a reference to the other

pub mod auth;
pub mod console;
pub mod render;

use std::sync::Arc;

use thiserror::Error;

use crate::batch::{BatchSettings, BatchWorkflow, Clipboard};
use crate::check::{CheckSettings, SingleCheckWorkflow};
use crate::config::ClientConfig;
use crate::gateway::Gateway;

pub use auth::{Authenticator, ConfiguredCredentials, Credentials};
pub use console::Console;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{}", auth::LOGIN_FAILED)]
    LoginFailed,

    #[error("Please log in first.")]
    NotLoggedIn,
}

struct Workflows<G: Gateway, C: Clipboard> {
    check: SingleCheckWorkflow<G>,
    batch: BatchWorkflow<G, C>,
}

pub struct WorkflowHost<G: Gateway, C: Clipboard> {
    gateway: Arc<G>,
    clipboard: Arc<C>,
    check_settings: CheckSettings,
    batch_settings: BatchSettings,
    tx_url_base: String,
    authenticator: Box<dyn Authenticator>,
    user: Option<String>,
    workflows: Option<Workflows<G, C>>,
}

impl<G: Gateway, C: Clipboard> WorkflowHost<G, C> {
    pub fn new(
        gateway: Arc<G>,
        clipboard: Arc<C>,
        config: &ClientConfig,
        authenticator: impl Authenticator + 'static,
    ) -> Self {
        Self {
            gateway,
            clipboard,
            check_settings: CheckSettings::from_config(config),
            batch_settings: BatchSettings::from_config(config),
            tx_url_base: config.explorer.tx_url_base.clone(),
            authenticator: Box::new(authenticator),
            user: None,
            workflows: None,
        }
    }

    /// Open the gate and create fresh workflows.
    pub fn login(&mut self, credentials: &Credentials) -> Result<(), HostError> {
        if !self.authenticator.authenticate(credentials) {
            tracing::info!(username = %credentials.username, "Login rejected");
            return Err(HostError::LoginFailed);
        }

        // Logging in again starts over.
        self.logout();
        self.workflows = Some(Workflows {
            check: SingleCheckWorkflow::new(Arc::clone(&self.gateway), self.check_settings.clone()),
            batch: BatchWorkflow::new(
                Arc::clone(&self.gateway),
                Arc::clone(&self.clipboard),
                self.batch_settings.clone(),
            ),
        });
        self.user = Some(credentials.username.clone());
        tracing::info!(username = %credentials.username, "Logged in");
        Ok(())
    }

    /// Tear down both workflows. Polling stops and rows are discarded.
    pub fn logout(&mut self) {
        if let Some(workflows) = self.workflows.take() {
            workflows.check.teardown();
            workflows.batch.teardown();
            tracing::info!(username = ?self.user, "Logged out");
        }
        self.user = None;
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.workflows.is_some()
    }

    pub fn check(&self) -> Result<&SingleCheckWorkflow<G>, HostError> {
        self.workflows
            .as_ref()
            .map(|w| &w.check)
            .ok_or(HostError::NotLoggedIn)
    }

    pub fn batch(&self) -> Result<&BatchWorkflow<G, C>, HostError> {
        self.workflows
            .as_ref()
            .map(|w| &w.batch)
            .ok_or(HostError::NotLoggedIn)
    }

    pub fn tx_url_base(&self) -> &str {
        &self.tx_url_base
    }

    pub fn check_lines(&self) -> Result<Vec<String>, HostError> {
        Ok(render::render_check(&self.check()?.view(), &self.tx_url_base))
    }

    pub fn batch_lines(&self) -> Result<Vec<String>, HostError> {
        let batch = self.batch()?;
        Ok(render::render_batch(
            &batch.view(),
            batch.settings().hash_preview_chars,
        ))
    }
}

impl<G: Gateway, C: Clipboard> Drop for WorkflowHost<G, C> {
    fn drop(&mut self) {
        self.logout();
    }
}
