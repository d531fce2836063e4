//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unexpected event: {0}")]
    UnexpectedEvent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;
