//! Clipboard backends for copying proof hashes.

use std::future::Future;
use std::process::Stdio;
use std::sync::Mutex;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("No clipboard program available")]
    Unavailable,

    #[error("Clipboard program '{program}' failed: {reason}")]
    Command { program: String, reason: String },
}

/// Destination for copied text.
pub trait Clipboard: Send + Sync + 'static {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send;
}

/// Pipes text into a clipboard program's stdin (`pbcopy`, `wl-copy`, ...).
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    argv: Vec<String>,
}

impl CommandClipboard {
    /// Use an explicit program and arguments.
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Pick the usual clipboard program for this platform.
    pub fn detect() -> Self {
        let argv: &[&str] = if cfg!(target_os = "macos") {
            &["pbcopy"]
        } else if cfg!(windows) {
            &["clip"]
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            &["wl-copy"]
        } else {
            &["xclip", "-selection", "clipboard"]
        };
        Self::new(argv.iter().map(|s| s.to_string()).collect())
    }

    /// Configured program, or the platform default.
    pub fn from_config(argv: Option<&[String]>) -> Self {
        match argv {
            Some(argv) if !argv.is_empty() => Self::new(argv.to_vec()),
            _ => Self::detect(),
        }
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    fn failure(&self, reason: impl ToString) -> ClipboardError {
        ClipboardError::Command {
            program: self.program().unwrap_or_default().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args) = self.argv.split_first().ok_or(ClipboardError::Unavailable)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.failure(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(|e| self.failure(e))?;
        }

        let status = child.wait().await.map_err(|e| self.failure(e))?;
        if status.success() {
            Ok(())
        } else {
            Err(self.failure(status))
        }
    }
}

/// Keeps the last copied value in memory. Used where no system clipboard
/// exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        Ok(())
    }
}
