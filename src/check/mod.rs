//! Single transaction check subsystem.
//!
//! # Data Flow
//! ```text
//! raw identifier
//!     → workflow.rs (validate, submit through the gateway)
//!     → CheckResult stored as the current result
//!     → chain reference present?
//!         no  → Awaiting (terminal for this attempt)
//!         yes → polling.rs session: poll every interval until mined
//!     → state.rs snapshots published to subscribers
//! ```
//!
//! # Design Decisions
//! - One tagged phase instead of independent flags; a session exists only
//!   inside the `Polling`/`Mined` phases
//! - The session's timer is released by dropping its handle, and every exit
//!   path goes through the same routine
//! - Poll failures are absorbed and never become the visible error

pub mod polling;
pub mod state;
pub mod workflow;

pub use polling::SessionInfo;
pub use state::CheckView;
pub use workflow::{CheckError, CheckSettings, SingleCheckWorkflow};
