//! Transaction submission.
//!
//! # Key Components
//!
//! - [`TransactionSubmitter`]: the seam the strategy submits through
//! - [`WalletClient`]: JSON-RPC client of the wallet service
//! - [`MockSubmitter`]: recording submitter for tests

pub mod error;
pub mod submitter;
pub mod transaction;
pub mod wallet;

pub use error::{ExecutorError, ExecutorResult};
pub use submitter::{BoxFuture, DynSubmitter, MockSubmitter, SubmitResult, TransactionSubmitter};
pub use transaction::to_wallet_json;
pub use wallet::WalletClient;
