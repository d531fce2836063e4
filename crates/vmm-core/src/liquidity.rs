//! Liquidity commitment of the agent's party.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::MarketId;

/// Standing liquidity commitment. `commitment_amount` is in
/// settlement-asset fixed-point units, `fee` is a plain fraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityProvision {
    pub id: String,
    pub party_id: String,
    pub market_id: MarketId,
    pub commitment_amount: Decimal,
    pub fee: Decimal,
    pub status: String,
}
