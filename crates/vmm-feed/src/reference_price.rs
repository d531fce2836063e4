//! Latest best bid/ask from the external reference venue.

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A consistent (bid, ask) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReferencePrice {
    pub bid: Decimal,
    pub ask: Decimal,
}

#[derive(Debug, Default)]
struct Inner {
    price: ReferencePrice,
    updated_at: Option<Instant>,
}

/// Last-write-wins reference price, shared as `Arc<ReferencePriceFeed>`.
///
/// Bid and ask are written and read together under one lock, so a reader
/// never pairs the bid of one update with the ask of another.
#[derive(Debug, Default)]
pub struct ReferencePriceFeed {
    inner: RwLock<Inner>,
}

impl ReferencePriceFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, bid: Decimal, ask: Decimal) {
        let mut inner = self.inner.write();
        inner.price = ReferencePrice { bid, ask };
        inner.updated_at = Some(Instant::now());
    }

    /// Zeros until the first `set`.
    pub fn get(&self) -> ReferencePrice {
        self.inner.read().price
    }

    /// Time since the last update, `None` if never set.
    pub fn age(&self) -> Option<Duration> {
        self.inner.read().updated_at.map(|t| t.elapsed())
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().updated_at.is_some()
    }
}
