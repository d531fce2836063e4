//! Strategy error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("No funds: available {asset} balance is zero")]
    NoFunds { asset: String },

    #[error("Market not loaded")]
    MarketNotLoaded,

    #[error("Settlement asset not found: {0}")]
    AssetNotFound(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Precision error: {0}")]
    Precision(#[from] vmm_core::CoreError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
