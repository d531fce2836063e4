//! Decimal parsing and fixed-point conversion.
//!
//! The exchange speaks fixed-point integers scaled by `10^decimals`;
//! [`PrecisionConverter`] moves values across that boundary.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::market::{Asset, Market};

/// Parse a decimal string as sent by the exchange (`"1000.5"`, `"42"`).
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).map_err(CoreError::from)
}

/// `10^decimals` as an exact decimal.
///
/// Fails for scales beyond what `Decimal` can represent (28 digits).
fn scale_factor(decimals: u32) -> Result<Decimal> {
    if decimals > 28 {
        return Err(CoreError::InvalidPrecision(decimals));
    }
    Ok(Decimal::from_i128_with_scale(10i128.pow(decimals), 0))
}

/// Converts between human-scale decimals and the exchange's fixed-point
/// integer representation for one market.
///
/// "To" conversions truncate towards zero: the exchange only accepts
/// integer strings, and rounding up could oversize an order or commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionConverter {
    position_factor: Decimal,
    price_factor: Decimal,
    asset_factor: Decimal,
}

impl PrecisionConverter {
    pub fn new(position_decimals: u32, price_decimals: u32, asset_decimals: u32) -> Result<Self> {
        Ok(Self {
            position_factor: scale_factor(position_decimals)?,
            price_factor: scale_factor(price_decimals)?,
            asset_factor: scale_factor(asset_decimals)?,
        })
    }

    /// Build from the market definition and its settlement asset.
    pub fn for_market(market: &Market, settlement_asset: &Asset) -> Result<Self> {
        Self::new(
            market.position_decimal_places,
            market.decimal_places,
            settlement_asset.decimals,
        )
    }

    pub fn to_price_precision(&self, price: Decimal) -> Decimal {
        (price * self.price_factor).trunc()
    }

    pub fn from_price_precision(&self, price: Decimal) -> Decimal {
        price / self.price_factor
    }

    pub fn to_position_precision(&self, size: Decimal) -> Decimal {
        (size * self.position_factor).trunc()
    }

    pub fn from_position_precision(&self, size: Decimal) -> Decimal {
        size / self.position_factor
    }

    /// Settlement-asset amounts (balances, commitments).
    pub fn to_asset_precision(&self, amount: Decimal) -> Decimal {
        (amount * self.asset_factor).trunc()
    }

    pub fn from_asset_precision(&self, amount: Decimal) -> Decimal {
        amount / self.asset_factor
    }
}

/// Render a fixed-point value as the integer string the exchange expects.
pub fn to_integer_string(value: Decimal) -> String {
    value.trunc().normalize().to_string()
}
