//! Domain types shared by the gateway and the workflows.

pub mod batch;
pub mod chain;
pub mod check;
pub mod transaction;

pub use batch::{BatchFile, BatchRow, FraudStatus, UploadResponse};
pub use chain::ChainReference;
pub use check::{CheckResult, TxnStatus};
pub use transaction::{TransactionId, ValidationError};
