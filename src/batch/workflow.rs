//! Batch upload workflow.
//!
//! # Responsibilities
//! - Refuse to submit without a file, locally
//! - Allow a single upload in flight
//! - Replace the row list wholesale on success; keep it on failure
//! - Copy full row hashes and drive the transient copy indicator

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::batch::clipboard::{Clipboard, ClipboardError};
use crate::batch::copy::CopyIndicator;
use crate::config::ClientConfig;
use crate::gateway::{Gateway, GatewayError};
use crate::lifecycle::TaskGuard;
use crate::observability::metrics;
use crate::types::{BatchFile, BatchRow, ValidationError};

/// Errors returned by `BatchWorkflow::submit`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The selected file could not be read.
    #[error("Could not read {path}: {reason}")]
    File { path: String, reason: String },

    #[error("A batch is already being analyzed.")]
    Busy,

    #[error("The batch upload was cancelled.")]
    Cancelled,
}

/// Errors returned by `BatchWorkflow::copy`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CopyError {
    /// Row indices are zero-based; messages number rows from 1.
    #[error("Row {} does not exist", .0 + 1)]
    NoSuchRow(usize),

    #[error("Row {} has no hash to copy", .0 + 1)]
    NoHash(usize),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Tunables for a `BatchWorkflow`.
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub copy_indicator: Duration,
    pub hash_preview_chars: usize,
}

impl BatchSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            copy_indicator: config.batch.copy_indicator(),
            hash_preview_chars: config.batch.hash_preview_chars,
        }
    }
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            copy_indicator: Duration::from_millis(1200),
            hash_preview_chars: 5,
        }
    }
}

/// Snapshot of a `BatchWorkflow`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchView {
    /// Rows of the last successful upload, in backend order.
    pub rows: Arc<Vec<BatchRow>>,
    pub submitting: bool,
    /// Message of the last failed attempt, cleared by the next submission.
    pub error: Option<String>,
    /// Row currently showing "copied".
    pub copied_row: Option<usize>,
}

#[derive(Default)]
struct Inner {
    rows: Arc<Vec<BatchRow>>,
    /// Incremented whenever `rows` is replaced.
    rows_generation: u64,
    in_flight: bool,
    error: Option<String>,
    copy: CopyIndicator,
    torn_down: bool,
}

impl Inner {
    fn view(&self) -> BatchView {
        BatchView {
            rows: Arc::clone(&self.rows),
            submitting: self.in_flight,
            error: self.error.clone(),
            copied_row: self.copy.row(),
        }
    }
}

struct Shared<G, C> {
    gateway: Arc<G>,
    clipboard: Arc<C>,
    settings: BatchSettings,
    inner: Mutex<Inner>,
    updates: watch::Sender<BatchView>,
}

impl<G: Gateway, C: Clipboard> Shared<G, C> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.view());
    }

    fn expire_copy(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.copy.expire(generation) {
            self.publish(&inner);
        }
    }
}

/// Clears the in-flight flag when a `submit` future is dropped before the
/// upload finished.
struct PendingUpload<'a, G: Gateway, C: Clipboard> {
    shared: &'a Shared<G, C>,
    settled: bool,
}

impl<G: Gateway, C: Clipboard> Drop for PendingUpload<'_, G, C> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.shared.lock();
        if inner.in_flight {
            inner.in_flight = false;
            self.shared.publish(&inner);
            tracing::debug!("Batch upload abandoned before the backend answered");
        }
    }
}

/// Uploads one transaction file at a time and keeps the resulting rows.
///
/// Dropping the workflow tears it down.
pub struct BatchWorkflow<G: Gateway, C: Clipboard> {
    shared: Arc<Shared<G, C>>,
}

impl<G: Gateway, C: Clipboard> BatchWorkflow<G, C> {
    pub fn new(gateway: Arc<G>, clipboard: Arc<C>, settings: BatchSettings) -> Self {
        let (updates, _) = watch::channel(BatchView::default());
        Self {
            shared: Arc::new(Shared {
                gateway,
                clipboard,
                settings,
                inner: Mutex::new(Inner::default()),
                updates,
            }),
        }
    }

    pub fn view(&self) -> BatchView {
        self.shared.lock().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchView> {
        self.shared.updates.subscribe()
    }

    pub fn settings(&self) -> &BatchSettings {
        &self.shared.settings
    }

    /// Upload the selected file and replace the row list with the result.
    ///
    /// `None` means no file was selected; that never reaches the gateway.
    pub async fn submit(&self, file: Option<&Path>) -> Result<Arc<Vec<BatchRow>>, BatchError> {
        let path = {
            let mut inner = self.shared.lock();
            if inner.torn_down {
                return Err(BatchError::Cancelled);
            }
            if inner.in_flight {
                return Err(BatchError::Busy);
            }

            let Some(path) = file else {
                let err = BatchError::from(ValidationError::NoFileProvided);
                inner.error = Some(err.to_string());
                self.shared.publish(&inner);
                metrics::record_batch("rejected");
                return Err(err);
            };

            inner.in_flight = true;
            inner.error = None;
            self.shared.publish(&inner);
            path
        };

        let mut pending = PendingUpload {
            shared: &self.shared,
            settled: false,
        };
        let outcome = self.upload(path).await;
        pending.settled = true;

        let mut inner = self.shared.lock();
        inner.in_flight = false;
        if inner.torn_down {
            return Err(BatchError::Cancelled);
        }

        match outcome {
            Ok(rows) => {
                let rows = Arc::new(rows);
                inner.rows = Arc::clone(&rows);
                inner.rows_generation += 1;
                inner.copy.reset();
                self.shared.publish(&inner);
                metrics::record_batch("ok");
                metrics::record_batch_rows(rows.len());
                Ok(rows)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Batch upload failed");
                metrics::record_batch(match &err {
                    BatchError::Gateway(e) => e.kind(),
                    _ => "file",
                });
                inner.error = Some(err.to_string());
                self.shared.publish(&inner);
                Err(err)
            }
        }
    }

    async fn upload(&self, path: &Path) -> Result<Vec<BatchRow>, BatchError> {
        let file = BatchFile::read(path).await.map_err(|e| BatchError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let span = tracing::info_span!(
            "batch",
            attempt_id = %Uuid::new_v4(),
            file = %file.file_name,
            bytes = file.contents.len()
        );
        let response = self
            .shared
            .gateway
            .upload_batch(&file)
            .instrument(span.clone())
            .await?;

        let _entered = span.enter();
        tracing::info!(
            processed = ?response.processed,
            rows = response.results.len(),
            "Batch analyzed"
        );
        Ok(response.results)
    }

    /// Copy the full hash of `row` to the clipboard and mark the row as
    /// copied for the configured window.
    pub async fn copy(&self, row: usize) -> Result<String, CopyError> {
        let (hash, rows_generation) = {
            let inner = self.shared.lock();
            let record = inner.rows.get(row).ok_or(CopyError::NoSuchRow(row))?;
            let hash = record.hashed_value.clone().ok_or(CopyError::NoHash(row))?;
            (hash, inner.rows_generation)
        };

        self.shared.clipboard.write_text(&hash).await?;

        let mut inner = self.shared.lock();
        if inner.torn_down || inner.rows_generation != rows_generation {
            // The row the user clicked is gone; the text is copied but
            // there is nothing left to mark.
            return Ok(hash);
        }

        let generation = inner.copy.set(row);
        let shared = Arc::clone(&self.shared);
        let window = self.shared.settings.copy_indicator;
        let timer = TaskGuard::spawn(async move {
            tokio::time::sleep(window).await;
            shared.expire_copy(generation);
        });
        inner.copy.arm(generation, timer);
        self.shared.publish(&inner);

        Ok(hash)
    }

    /// Stop the copy timer and refuse further submissions. Idempotent.
    pub fn teardown(&self) {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }
        inner.torn_down = true;
        inner.copy.reset();
        self.shared.publish(&inner);
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }
}

impl<G: Gateway, C: Clipboard> Drop for BatchWorkflow<G, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
