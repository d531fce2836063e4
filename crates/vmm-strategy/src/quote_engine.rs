//! Quote ladder construction.
//!
//! A side is quoted as `num_levels` equal-sized limit orders stepping away
//! from the reference price: below it for bids, above it for asks.

use rust_decimal::Decimal;

use vmm_core::{
    to_integer_string, MarketId, OrderSide, OrderSubmission, OrderType, PrecisionConverter,
    TimeInForce,
};

/// A single quote level in human units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLevel {
    pub price: Decimal,
    pub size: Decimal,
    /// 1 = closest to the reference price.
    pub level: u32,
}

/// Build one side of the ladder.
///
/// Every level carries `volume / (num_levels * price)`; level `i` is priced
/// at `price * (1 - i*step)` for buys and `price * (1 + i*step)` for sells.
/// A non-positive volume or price yields no levels.
pub fn build_ladder(
    side: OrderSide,
    price: Decimal,
    volume: Decimal,
    num_levels: u32,
    step: Decimal,
) -> Vec<QuoteLevel> {
    if num_levels == 0 || price <= Decimal::ZERO || volume <= Decimal::ZERO {
        return Vec::new();
    }

    let size = volume / (Decimal::from(num_levels) * price);
    (1..=num_levels)
        .map(|i| {
            let offset = Decimal::from(i) * step;
            let factor = match side {
                OrderSide::Buy => Decimal::ONE - offset,
                OrderSide::Sell => Decimal::ONE + offset,
            };
            QuoteLevel {
                price: price * factor,
                size,
                level: i,
            }
        })
        .collect()
}

/// Convert levels to GTC limit submissions in exchange precision.
///
/// Levels whose size or price truncates to zero are dropped.
pub fn to_submissions(
    market_id: &MarketId,
    side: OrderSide,
    levels: &[QuoteLevel],
    converter: &PrecisionConverter,
    reference: &str,
) -> Vec<OrderSubmission> {
    levels
        .iter()
        .filter_map(|level| {
            let price = converter.to_price_precision(level.price);
            let size = converter.to_position_precision(level.size);
            if price <= Decimal::ZERO || size <= Decimal::ZERO {
                return None;
            }
            Some(OrderSubmission {
                market_id: market_id.clone(),
                price: to_integer_string(price),
                size: to_integer_string(size),
                side,
                time_in_force: TimeInForce::GoodTilCancelled,
                order_type: OrderType::Limit,
                reference: reference.to_string(),
            })
        })
        .collect()
}
