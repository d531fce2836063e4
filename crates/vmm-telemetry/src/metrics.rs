//! Prometheus metrics for the market maker.
//!
//! Covers:
//! - Strategy tick outcomes
//! - Transaction submissions and their latency
//! - Stream liveness and reconnects
//! - Reference price and committed balance
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_histogram_vec,
    register_int_gauge, CounterVec, Encoder, Gauge, GaugeVec, HistogramVec, IntGauge,
    TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Strategy ticks by outcome (submitted/skipped/submit_failed).
pub static STRATEGY_TICKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vmm_strategy_ticks_total",
        "Strategy ticks by outcome",
        &["outcome", "reason"]
    )
    .unwrap()
});

/// Transactions submitted, by kind and result.
pub static SUBMISSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vmm_submissions_total",
        "Transactions submitted through the wallet",
        &["kind", "result"]
    )
    .unwrap()
});

/// Submission round-trip in milliseconds.
pub static SUBMIT_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "vmm_submit_latency_ms",
        "Wallet submission latency in milliseconds",
        &["kind"],
        vec![10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Stream liveness (1 = live).
pub static STREAM_LIVE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "vmm_stream_live",
        "Stream liveness (1=live)",
        &["stream"]
    )
    .unwrap()
});

/// Reconnects per stream since start.
pub static STREAM_RECONNECTS: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "vmm_stream_reconnects",
        "Stream reconnects since start",
        &["stream"]
    )
    .unwrap()
});

/// Reference best bid/ask.
pub static REFERENCE_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "vmm_reference_price",
        "Reference venue best price",
        &["side"]
    )
    .unwrap()
});

/// Balance available for quoting and commitment (human units).
pub static AVAILABLE_BALANCE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "vmm_available_balance",
        "General plus bond balance of the settlement asset"
    )
    .unwrap()
});

/// Orders in the last submitted ladder.
pub static QUOTED_ORDERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("vmm_quoted_orders", "Orders in the last submitted ladder").unwrap()
});

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    pub fn tick(outcome: &str, reason: &str) {
        STRATEGY_TICKS_TOTAL
            .with_label_values(&[outcome, reason])
            .inc();
    }

    pub fn submission(kind: &str, result: &str, latency_ms: f64) {
        SUBMISSIONS_TOTAL.with_label_values(&[kind, result]).inc();
        SUBMIT_LATENCY_MS
            .with_label_values(&[kind])
            .observe(latency_ms);
    }

    pub fn stream_status(stream: &str, live: bool, reconnects: u64) {
        STREAM_LIVE
            .with_label_values(&[stream])
            .set(if live { 1.0 } else { 0.0 });
        STREAM_RECONNECTS
            .with_label_values(&[stream])
            .set(reconnects as f64);
    }

    pub fn reference_price(bid: f64, ask: f64) {
        REFERENCE_PRICE.with_label_values(&["bid"]).set(bid);
        REFERENCE_PRICE.with_label_values(&["ask"]).set(ask);
    }

    pub fn available_balance(balance: f64) {
        AVAILABLE_BALANCE.set(balance);
    }

    pub fn quoted_orders(count: usize) {
        QUOTED_ORDERS.set(count as i64);
    }

    /// Render every registered metric in the text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
