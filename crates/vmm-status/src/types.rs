//! Status API types.
//!
//! Market entities are serialized as the store holds them: prices, sizes,
//! and balances in exchange fixed-point form. The reference bid/ask are
//! human-scale.

use rust_decimal::Decimal;
use serde::Serialize;

use vmm_core::{AccountBalance, Asset, LiquidityProvision, Market, MarketData, Order, Position};
use vmm_feed::StreamHealthView;

/// Full state document served on `GET /state`.
#[derive(Debug, Clone, Serialize)]
pub struct StateDocument {
    /// Timestamp when the document was built (Unix milliseconds).
    pub timestamp_ms: i64,
    pub position: Option<Position>,
    pub market: Option<Market>,
    pub market_data: Option<MarketData>,
    /// Reference venue best bid, `None` until the first ticker update.
    pub best_bid: Option<Decimal>,
    /// Reference venue best ask.
    pub best_ask: Option<Decimal>,
    pub orders: Vec<Order>,
    pub accounts: Vec<AccountBalance>,
    pub assets: Vec<Asset>,
    pub liquidity_provision: Option<LiquidityProvision>,
    pub streams: Vec<StreamHealthView>,
}

/// Stream health served on `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthDocument {
    pub timestamp_ms: i64,
    /// Every stream is live.
    pub healthy: bool,
    pub streams: Vec<StreamHealthView>,
}
