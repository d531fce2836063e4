//! Party position on a market.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::MarketId;

/// Position of the agent's party. Values are fixed-point integers:
/// `open_volume` in position precision (signed, negative = short) and
/// `average_entry_price` in price precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub market_id: MarketId,
    pub party_id: String,
    pub open_volume: i64,
    pub average_entry_price: Decimal,
    #[serde(default)]
    pub realised_pnl: Decimal,
    #[serde(default)]
    pub unrealised_pnl: Decimal,
}
