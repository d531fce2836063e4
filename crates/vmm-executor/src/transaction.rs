//! Wallet JSON encoding of transactions.
//!
//! The wallet expects the exchange's command JSON: camelCase keys, enum
//! names such as `SIDE_BUY`, and integer strings for price, size and
//! commitment amounts. A cancellation without `orderId` cancels every
//! order of the party on the market.

use serde::Serialize;

use vmm_core::{
    BatchMarketInstructions, LiquidityProvisionAmendment, LiquidityProvisionSubmission,
    OrderCancellation, OrderSubmission, Transaction,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireCancellation<'a> {
    market_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSubmission<'a> {
    market_id: &'a str,
    price: &'a str,
    size: &'a str,
    side: &'static str,
    time_in_force: &'static str,
    #[serde(rename = "type")]
    order_type: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    reference: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBatch<'a> {
    cancellations: Vec<WireCancellation<'a>>,
    submissions: Vec<WireSubmission<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireLiquidity<'a> {
    market_id: &'a str,
    commitment_amount: &'a str,
    fee: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    reference: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WireTransaction<'a> {
    BatchMarketInstructions(WireBatch<'a>),
    LiquidityProvisionSubmission(WireLiquidity<'a>),
    LiquidityProvisionAmendment(WireLiquidity<'a>),
}

fn cancellation(c: &OrderCancellation) -> WireCancellation<'_> {
    WireCancellation {
        market_id: c.market_id.as_str(),
    }
}

fn submission(s: &OrderSubmission) -> WireSubmission<'_> {
    WireSubmission {
        market_id: s.market_id.as_str(),
        price: &s.price,
        size: &s.size,
        side: s.side.as_wire(),
        time_in_force: s.time_in_force.as_wire(),
        order_type: s.order_type.as_wire(),
        reference: &s.reference,
    }
}

fn batch(b: &BatchMarketInstructions) -> WireBatch<'_> {
    WireBatch {
        cancellations: b.cancellations.iter().map(cancellation).collect(),
        submissions: b.submissions.iter().map(submission).collect(),
    }
}

fn lp_submission(lp: &LiquidityProvisionSubmission) -> WireLiquidity<'_> {
    WireLiquidity {
        market_id: lp.market_id.as_str(),
        commitment_amount: &lp.commitment_amount,
        fee: &lp.fee,
        reference: &lp.reference,
    }
}

fn lp_amendment(lp: &LiquidityProvisionAmendment) -> WireLiquidity<'_> {
    WireLiquidity {
        market_id: lp.market_id.as_str(),
        commitment_amount: &lp.commitment_amount,
        fee: &lp.fee,
        reference: &lp.reference,
    }
}

/// `{"<commandName>": {...}}` as accepted by `client.send_transaction`.
pub fn to_wallet_json(tx: &Transaction) -> serde_json::Result<serde_json::Value> {
    let wire = match tx {
        Transaction::BatchMarketInstructions(b) => WireTransaction::BatchMarketInstructions(batch(b)),
        Transaction::LiquidityProvisionSubmission(lp) => {
            WireTransaction::LiquidityProvisionSubmission(lp_submission(lp))
        }
        Transaction::LiquidityProvisionAmendment(lp) => {
            WireTransaction::LiquidityProvisionAmendment(lp_amendment(lp))
        }
    };
    serde_json::to_value(wire)
}
