//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data node error: {0}")]
    DataNode(#[from] vmm_datanode::DataNodeError),

    #[error("Executor error: {0}")]
    Executor(#[from] vmm_executor::ExecutorError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] vmm_strategy::StrategyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] vmm_telemetry::TelemetryError),

    #[error("Status server error: {0}")]
    Status(#[from] vmm_status::StatusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
