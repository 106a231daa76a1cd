//! Batch analysis subsystem.
//!
//! # Data Flow
//! ```text
//! selected file (or none)
//!     → workflow.rs (local presence check, single upload in flight)
//!     → gateway multipart upload
//!     → rows replaced wholesale on success, kept on failure
//!     → copy: full hash → clipboard.rs, row marked by copy.rs until expiry
//! ```

pub mod clipboard;
pub(crate) mod copy;
pub mod workflow;

pub use clipboard::{Clipboard, ClipboardError, CommandClipboard, MemoryClipboard};
pub use workflow::{BatchError, BatchSettings, BatchView, BatchWorkflow, CopyError};
