//! vmm-status - Read-only HTTP view of the market maker.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐ ┌────────────────────┐ ┌──────────────┐
//! │ StateStore  │ │ ReferencePriceFeed │ │ StreamHealth │
//! └──────┬──────┘ └─────────┬──────────┘ └──────┬───────┘
//!        └──────────────────┼───────────────────┘
//!                           ▼
//!                  StatusState (Arc handles)
//!                           ▼
//!       axum HTTP server (default port 8080)
//!         GET /state   → full JSON document
//!         GET /health  → stream health (503 unless all live)
//!         GET /metrics → prometheus text format
//! ```

mod config;
mod error;
mod server;
mod state;
mod types;

pub use config::StatusConfig;
pub use error::{StatusError, StatusResult};
pub use server::{bind, create_router, serve};
pub use state::StatusState;
pub use types::{HealthDocument, StateDocument};
