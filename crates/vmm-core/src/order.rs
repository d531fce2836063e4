//! Order-related types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::market::MarketId;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Exchange wire name.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Buy => "SIDE_BUY",
            Self::Sell => "SIDE_SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for OrderSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIDE_BUY" => Ok(Self::Buy),
            "SIDE_SELL" => Ok(Self::Sell),
            other => Err(CoreError::UnknownVariant {
                kind: "side",
                value: other.to_string(),
            }),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Limit,
}

impl OrderType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Limit => "TYPE_LIMIT",
        }
    }
}

/// Time-in-force for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good-til-cancelled.
    #[default]
    #[serde(rename = "gtc")]
    GoodTilCancelled,
}

impl TimeInForce {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::GoodTilCancelled => "TIME_IN_FORCE_GTC",
        }
    }
}

/// Order lifecycle status as reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Expired,
    Cancelled,
    Stopped,
    Filled,
    Rejected,
    PartiallyFilled,
    Parked,
    Unspecified,
}

impl OrderStatus {
    /// Only active orders are kept in the store.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "STATUS_ACTIVE" => Self::Active,
            "STATUS_EXPIRED" => Self::Expired,
            "STATUS_CANCELLED" => Self::Cancelled,
            "STATUS_STOPPED" => Self::Stopped,
            "STATUS_FILLED" => Self::Filled,
            "STATUS_REJECTED" => Self::Rejected,
            "STATUS_PARTIALLY_FILLED" => Self::PartiallyFilled,
            "STATUS_PARKED" => Self::Parked,
            "STATUS_UNSPECIFIED" => Self::Unspecified,
            other => {
                return Err(CoreError::UnknownVariant {
                    kind: "order status",
                    value: other.to_string(),
                })
            }
        })
    }
}

/// An order of the agent's party. Price and size are fixed-point integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub market_id: MarketId,
    pub side: OrderSide,
    pub price: Decimal,
    pub size: Decimal,
    pub remaining: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub reference: String,
}
