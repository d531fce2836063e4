//! Market definition, live market data, and asset reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market identifier (hex string assigned by the exchange).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketId(pub String);

impl MarketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tradable instrument of a market.
///
/// Both variants settle in an asset; the variant only matters for
/// which product the exchange runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Instrument {
    Future { settlement_asset: AssetId },
    Perpetual { settlement_asset: AssetId },
}

impl Instrument {
    pub fn settlement_asset(&self) -> &AssetId {
        match self {
            Self::Future { settlement_asset } | Self::Perpetual { settlement_asset } => {
                settlement_asset
            }
        }
    }
}

/// Immutable market definition, loaded once at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    /// Human-readable instrument name (e.g. "BTC/USDT Perp").
    pub name: String,
    /// Price decimal places.
    pub decimal_places: u32,
    /// Position (size) decimal places.
    pub position_decimal_places: u32,
    pub instrument: Instrument,
}

impl Market {
    pub fn settlement_asset(&self) -> &AssetId {
        self.instrument.settlement_asset()
    }
}

/// Per-party liquidity SLA statistics carried in market data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityProviderSla {
    pub party: String,
    pub current_epoch_fraction_of_time_on_book: Decimal,
    pub last_epoch_fraction_of_time_on_book: Decimal,
}

/// Latest-only live market statistics. Prices are fixed-point integers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarketData {
    pub market: String,
    pub mark_price: Decimal,
    pub best_bid_price: Decimal,
    pub best_offer_price: Decimal,
    pub market_trading_mode: String,
    pub target_stake: Decimal,
    pub supplied_stake: Decimal,
    #[serde(default)]
    pub liquidity_provider_sla: Vec<LiquidityProviderSla>,
}

/// Asset reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub symbol: String,
    pub decimals: u32,
}
