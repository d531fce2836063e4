//! Core domain types for the market maker agent.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Market`, `Instrument`, `MarketData`, `Asset`: venue reference and live data
//! - `Order`, `Position`, `AccountBalance`, `LiquidityProvision`: party state
//! - `PrecisionConverter`: human-scale <-> fixed-point conversion
//! - `Transaction`: commands submitted through the wallet

pub mod account;
pub mod command;
pub mod decimal;
pub mod error;
pub mod liquidity;
pub mod market;
pub mod order;
pub mod position;

pub use account::{AccountBalance, AccountKey, AccountType};
pub use command::{
    BatchMarketInstructions, LiquidityProvisionAmendment, LiquidityProvisionSubmission,
    OrderCancellation, OrderSubmission, Transaction,
};
pub use decimal::{parse_decimal, to_integer_string, PrecisionConverter};
pub use error::{CoreError, Result};
pub use liquidity::LiquidityProvision;
pub use market::{Asset, AssetId, Instrument, LiquidityProviderSla, Market, MarketData, MarketId};
pub use order::{Order, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use position::Position;
