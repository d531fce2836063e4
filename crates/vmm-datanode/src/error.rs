//! Data-node error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataNodeError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP {status} from {path}: {body}")]
    HttpStatus {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Market {0} has no supported instrument")]
    UnsupportedInstrument(String),

    #[error("Invalid number of positions loaded: {0}")]
    TooManyPositions(usize),

    #[error("Unexpected frame: {0}")]
    UnexpectedFrame(String),

    #[error("Stream error from data node: {0}")]
    StreamError(String),

    #[error("Invalid value: {0}")]
    Core(#[from] vmm_core::CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DataNodeResult<T> = Result<T, DataNodeError>;
