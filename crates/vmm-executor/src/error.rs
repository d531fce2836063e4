//! Executor error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Wallet error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet response carried neither result nor error")]
    MissingResult,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
