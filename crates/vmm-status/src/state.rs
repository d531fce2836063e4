//! Status state.
//!
//! Holds shared handles to the exchange store, the reference price, and the
//! stream health table. Every request reads them afresh; nothing is cached.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;

use vmm_feed::{ReferencePriceFeed, StateStore, StreamHealth, StreamStatus};
use vmm_telemetry::Metrics;

use crate::types::{HealthDocument, StateDocument};

#[derive(Clone)]
pub struct StatusState {
    store: Arc<StateStore>,
    reference: Arc<ReferencePriceFeed>,
    health: Arc<StreamHealth>,
}

impl StatusState {
    pub fn new(
        store: Arc<StateStore>,
        reference: Arc<ReferencePriceFeed>,
        health: Arc<StreamHealth>,
    ) -> Self {
        Self {
            store,
            reference,
            health,
        }
    }

    pub fn collect_state(&self) -> StateDocument {
        let (best_bid, best_ask) = if self.reference.is_set() {
            let price = self.reference.get();
            (Some(price.bid), Some(price.ask))
        } else {
            (None, None)
        };

        let mut orders = self.store.orders();
        orders.sort_by(|a, b| a.id.cmp(&b.id));
        let mut accounts = self.store.accounts();
        accounts.sort_by_key(|a| a.key());
        let mut assets = self.store.assets();
        assets.sort_by(|a, b| a.id.cmp(&b.id));

        StateDocument {
            timestamp_ms: Utc::now().timestamp_millis(),
            position: self.store.position(),
            market: self.store.market(),
            market_data: self.store.market_data(),
            best_bid,
            best_ask,
            orders,
            accounts,
            assets,
            liquidity_provision: self.store.liquidity_provision(),
            streams: self.health.snapshot(),
        }
    }

    pub fn collect_health(&self) -> HealthDocument {
        let streams = self.health.snapshot();
        let healthy = streams.iter().all(|s| s.status == StreamStatus::Live);
        HealthDocument {
            timestamp_ms: Utc::now().timestamp_millis(),
            healthy,
            streams,
        }
    }

    /// Push stream and reference price gauges before a scrape.
    pub fn refresh_metrics(&self) {
        for view in self.health.snapshot() {
            Metrics::stream_status(
                view.stream.as_str(),
                view.status == StreamStatus::Live,
                view.reconnects,
            );
        }
        if self.reference.is_set() {
            let price = self.reference.get();
            Metrics::reference_price(
                price.bid.to_f64().unwrap_or(0.0),
                price.ask.to_f64().unwrap_or(0.0),
            );
        }
    }
}

impl std::fmt::Debug for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusState")
            .field("reference_set", &self.reference.is_set())
            .finish_non_exhaustive()
    }
}
