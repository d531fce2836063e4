//! Transaction commands sent to the exchange through the wallet.
//!
//! Values here are already in exchange fixed-point form: prices, sizes,
//! and commitment amounts are integer strings. Building them from
//! human-scale decimals is the caller's job (see `PrecisionConverter`).

use serde::Serialize;

use crate::market::MarketId;
use crate::order::{OrderSide, OrderType, TimeInForce};

/// Cancel every order of the party on a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCancellation {
    pub market_id: MarketId,
}

/// A new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSubmission {
    pub market_id: MarketId,
    pub price: String,
    pub size: String,
    pub side: OrderSide,
    pub time_in_force: TimeInForce,
    pub order_type: OrderType,
    pub reference: String,
}

/// Cancellations are applied before submissions by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchMarketInstructions {
    pub cancellations: Vec<OrderCancellation>,
    pub submissions: Vec<OrderSubmission>,
}

impl BatchMarketInstructions {
    pub fn is_empty(&self) -> bool {
        self.cancellations.is_empty() && self.submissions.is_empty()
    }
}

/// New liquidity commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityProvisionSubmission {
    pub market_id: MarketId,
    pub commitment_amount: String,
    pub fee: String,
    pub reference: String,
}

/// Amendment of an existing commitment. Size and fee travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityProvisionAmendment {
    pub market_id: MarketId,
    pub commitment_amount: String,
    pub fee: String,
    pub reference: String,
}

/// One signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    BatchMarketInstructions(BatchMarketInstructions),
    LiquidityProvisionSubmission(LiquidityProvisionSubmission),
    LiquidityProvisionAmendment(LiquidityProvisionAmendment),
}

impl Transaction {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BatchMarketInstructions(_) => "batch",
            Self::LiquidityProvisionSubmission(_) => "lp_submission",
            Self::LiquidityProvisionAmendment(_) => "lp_amendment",
        }
    }
}
