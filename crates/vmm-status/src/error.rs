//! Status server errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub type StatusResult<T> = Result<T, StatusError>;
