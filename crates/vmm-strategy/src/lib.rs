//! Market making strategy.
//!
//! - [`StrategyEngine`]: bootstrap and the periodic requote tick
//! - [`build_ladder`]: equal-size ladder stepping away from a reference price
//! - [`reconcile`]: liquidity commitment submit/amend decision
//!
//! # Architecture
//!
//! ```text
//! StateStore + ReferencePriceFeed ──▶ StrategyEngine.tick()
//!                                      ├─ reconcile() → LP submit/amend
//!                                      └─ build_ladder() × 2 → batch
//!                                           ↓
//!                                      TransactionSubmitter
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod liquidity;
pub mod quote_engine;

pub use config::StrategyConfig;
pub use engine::{SkipReason, StrategyEngine, TickOutcome};
pub use error::{StrategyError, StrategyResult};
pub use liquidity::{reconcile, reconcile_pending, CommitmentTarget, LiquidityCommand};
pub use quote_engine::{build_ladder, to_submissions, QuoteLevel};
