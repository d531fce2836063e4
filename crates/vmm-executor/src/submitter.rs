//! Transaction submitter trait.
//!
//! The strategy hands finished [`Transaction`]s to a submitter and does not
//! care how they reach the exchange. The wallet client is the production
//! implementation; [`MockSubmitter`] records submissions for tests.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vmm_core::Transaction;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// Accepted by the wallet and forwarded to the network.
    Accepted { tx_hash: String },
    /// The wallet or network refused the transaction.
    Rejected(String),
    /// Transport-level failure.
    Error(String),
}

impl SubmitResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected(_) => "rejected",
            Self::Error(_) => "error",
        }
    }
}

/// Sends signed transactions to the exchange.
pub trait TransactionSubmitter: Send + Sync {
    fn submit(&self, tx: Transaction) -> BoxFuture<'_, SubmitResult>;
}

/// Arc wrapper for submitter trait objects.
pub type DynSubmitter = Arc<dyn TransactionSubmitter>;

/// Mock submitter for testing.
#[derive(Debug)]
pub struct MockSubmitter {
    /// Recorded submissions for verification.
    submissions: parking_lot::Mutex<Vec<Transaction>>,
    /// Next result to return.
    next_result: parking_lot::Mutex<SubmitResult>,
    /// Artificial latency in milliseconds.
    delay_ms: AtomicU64,
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self {
            submissions: parking_lot::Mutex::new(Vec::new()),
            next_result: parking_lot::Mutex::new(SubmitResult::Accepted {
                tx_hash: "mock".to_string(),
            }),
            delay_ms: AtomicU64::new(0),
        }
    }

    pub fn set_next_result(&self, result: SubmitResult) {
        *self.next_result.lock() = result;
    }

    /// Make every submission take `delay` before resolving.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<Transaction> {
        self.submissions.lock().clone()
    }

    pub fn clear(&self) {
        self.submissions.lock().clear();
    }
}

impl TransactionSubmitter for MockSubmitter {
    fn submit(&self, tx: Transaction) -> BoxFuture<'_, SubmitResult> {
        Box::pin(async move {
            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            self.submissions.lock().push(tx);
            self.next_result.lock().clone()
        })
    }
}
