//! Strategy configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Fraction of the available balance quoted on each side.
    #[serde(default = "default_quote_fraction")]
    pub quote_fraction: Decimal,

    /// Fraction of the available balance committed as liquidity.
    #[serde(default = "default_commitment_fraction")]
    pub commitment_fraction: Decimal,

    /// Liquidity fee bid with the commitment.
    #[serde(default = "default_fee")]
    pub fee: Decimal,

    /// Number of ladder levels per side.
    #[serde(default = "default_num_levels")]
    pub num_levels: u32,

    /// Relative price step between levels (0.002 = 0.2%).
    #[serde(default = "default_level_step")]
    pub level_step: Decimal,

    /// Requote interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Upper bound on one wallet submission.
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,

    /// Quoting pauses when the reference price is older than this many ticks.
    #[serde(default = "default_staleness_ticks")]
    pub staleness_ticks: u32,

    /// Reference attached to every order and commitment.
    #[serde(default = "default_order_reference")]
    pub order_reference: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            quote_fraction: default_quote_fraction(),
            commitment_fraction: default_commitment_fraction(),
            fee: default_fee(),
            num_levels: default_num_levels(),
            level_step: default_level_step(),
            tick_interval_ms: default_tick_interval_ms(),
            submit_timeout_ms: default_submit_timeout_ms(),
            staleness_ticks: default_staleness_ticks(),
            order_reference: default_order_reference(),
        }
    }
}

impl StrategyConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    /// Oldest acceptable reference price.
    pub fn max_reference_age(&self) -> Duration {
        self.tick_interval() * self.staleness_ticks
    }
}

fn default_quote_fraction() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_commitment_fraction() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_fee() -> Decimal {
    Decimal::new(1, 3) // 0.001
}
fn default_num_levels() -> u32 {
    5
}
fn default_level_step() -> Decimal {
    Decimal::new(2, 3) // 0.002
}
fn default_tick_interval_ms() -> u64 {
    5000
}
fn default_submit_timeout_ms() -> u64 {
    10_000
}
fn default_staleness_ticks() -> u32 {
    3
}
fn default_order_reference() -> String {
    "vega-mm".to_string()
}
