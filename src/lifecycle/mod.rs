//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → subscribers (watch loop, console) stop
//!             → workflows torn down → polling timers released
//!
//! Tasks (task.rs):
//!     background timers owned by TaskGuard, aborted on drop
//! ```

pub mod shutdown;
pub mod signals;
pub mod task;

pub use shutdown::Shutdown;
pub use task::TaskGuard;
