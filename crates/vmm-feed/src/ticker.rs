//! Reference-venue 24h ticker ingestion.
//!
//! Subscribes to `<symbol>@ticker`, discards the subscription confirmation
//! that arrives first on every connection, and writes each `24hrTicker`
//! event's best bid/ask into the [`ReferencePriceFeed`].

use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use vmm_ws::{ConnectionState, FrameHandler, WsError, WsResult};

use crate::error::{FeedError, FeedResult};
use crate::health::{StreamHealth, StreamKind};
use crate::reference_price::ReferencePriceFeed;

const TICKER_EVENT: &str = "24hrTicker";

/// Subscribe request for one symbol (lowercased, as the venue expects).
pub fn subscribe_frame(symbol: &str) -> String {
    serde_json::json!({
        "id": 1,
        "method": "SUBSCRIBE",
        "params": [format!("{}@ticker", symbol.to_lowercase())],
    })
    .to_string()
}

/// The fields of a ticker event the agent uses. Upper-case siblings
/// (`E`, `A`, `B`) exist on the wire and are ignored.
#[derive(Debug, Deserialize)]
pub struct TickerEvent {
    #[serde(rename = "e")]
    pub event: String,
    #[serde(rename = "s", default)]
    pub symbol: String,
    #[serde(rename = "b")]
    pub bid: Decimal,
    #[serde(rename = "a")]
    pub ask: Decimal,
}

/// Parse one ticker frame. Anything but a `24hrTicker` event is an error.
pub fn parse_ticker(text: &str) -> FeedResult<TickerEvent> {
    let event: TickerEvent = serde_json::from_str(text)
        .map_err(|e| FeedError::ParseError(format!("{e}: {text}")))?;
    if event.event != TICKER_EVENT {
        return Err(FeedError::UnexpectedEvent(event.event));
    }
    Ok(event)
}

/// Frame handler feeding the reference price.
pub struct TickerHandler {
    feed: Arc<ReferencePriceFeed>,
    health: Arc<StreamHealth>,
    awaiting_confirmation: AtomicBool,
}

impl TickerHandler {
    pub fn new(feed: Arc<ReferencePriceFeed>, health: Arc<StreamHealth>) -> Self {
        Self {
            feed,
            health,
            awaiting_confirmation: AtomicBool::new(true),
        }
    }
}

impl FrameHandler for TickerHandler {
    fn on_connected(&self) {
        self.awaiting_confirmation.store(true, Ordering::Release);
    }

    fn handle_text(&self, text: &str) -> WsResult<()> {
        if self.awaiting_confirmation.swap(false, Ordering::AcqRel) {
            debug!(frame = %text, "Discarding ticker subscription confirmation");
            return Ok(());
        }

        let event = parse_ticker(text).map_err(|e| match e {
            FeedError::UnexpectedEvent(kind) => WsError::UnexpectedMessage(kind),
            other => WsError::Decode(other.to_string()),
        })?;
        trace!(symbol = %event.symbol, bid = %event.bid, ask = %event.ask, "Reference price");
        self.feed.set(event.bid, event.ask);
        self.health.record_update(StreamKind::ReferencePrice);
        Ok(())
    }

    fn on_state_change(&self, state: ConnectionState) {
        self.health.set_status(StreamKind::ReferencePrice, state.into());
    }
}
