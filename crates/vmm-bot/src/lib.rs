//! Vega liquidity-providing market maker.
//!
//! Main application that orchestrates all components:
//! - REST bootstrap of the party's exchange state
//! - Five data-node stream subscriptions and one reference price ticker
//! - Strategy bootstrap followed by the periodic requote loop
//! - Read-only status server

pub mod app;
pub mod config;
pub mod error;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
