//! Application configuration.
//!
//! Loaded from TOML, then overridden by `VEGAMM_*` environment variables.
//! The wallet token is normally only supplied through the environment.

use crate::error::{AppError, AppResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vmm_status::StatusConfig;
use vmm_strategy::StrategyConfig;
use vmm_ws::ConnectionConfig;

/// Wallet service connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Wallet service base URL.
    #[serde(default = "default_wallet_url")]
    pub url: String,
    /// API token. Prefer `VEGAMM_WALLET_TOKEN` over putting it in the file.
    #[serde(default, skip_serializing)]
    pub token: String,
}

fn default_wallet_url() -> String {
    "http://127.0.0.1:1789".to_string()
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            url: default_wallet_url(),
            token: String::new(),
        }
    }
}

/// WebSocket settings shared by every stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsConfig {
    /// Maximum consecutive reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Base delay for reconnection backoff (ms).
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    /// Backoff cap (ms).
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// Reconnect when a stream stays silent this long (ms, 0 = never).
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

fn default_reconnect_base_delay_ms() -> u64 {
    1000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60_000
}

fn default_idle_timeout_ms() -> u64 {
    // Account and position topics can be quiet for a long time
    300_000
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl From<WsConfig> for ConnectionConfig {
    fn from(cfg: WsConfig) -> Self {
        Self {
            url: String::new(), // Set per stream
            max_reconnect_attempts: cfg.max_reconnect_attempts,
            reconnect_base_delay_ms: cfg.reconnect_base_delay_ms,
            reconnect_max_delay_ms: cfg.reconnect_max_delay_ms,
            idle_timeout_ms: cfg.idle_timeout_ms,
            handshake: Vec::new(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data node REST base URL.
    #[serde(default = "default_datanode_url")]
    pub datanode_url: String,
    /// Data node websocket base URL. Derived from `datanode_url` if unset.
    #[serde(default)]
    pub datanode_ws_url: Option<String>,
    /// Market to make (hex id).
    #[serde(default)]
    pub market_id: String,
    /// Party public key; also the key the wallet signs with.
    #[serde(default)]
    pub party_id: String,
    /// Reference venue symbol, e.g. "BTCUSDT".
    #[serde(default)]
    pub reference_symbol: String,
    /// Reference venue websocket URL.
    #[serde(default = "default_reference_ws_url")]
    pub reference_ws_url: String,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub websocket: WsConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

fn default_datanode_url() -> String {
    "http://127.0.0.1:3008".to_string()
}

fn default_reference_ws_url() -> String {
    "wss://stream.binance.com:443/ws".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            datanode_url: default_datanode_url(),
            datanode_ws_url: None,
            market_id: String::new(),
            party_id: String::new(),
            reference_symbol: String::new(),
            reference_ws_url: default_reference_ws_url(),
            wallet: WalletConfig::default(),
            websocket: WsConfig::default(),
            strategy: StrategyConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply `VEGAMM_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets: [(&str, &mut String); 7] = [
            ("VEGAMM_DATANODE_URL", &mut self.datanode_url),
            ("VEGAMM_VEGA_MARKET", &mut self.market_id),
            ("VEGAMM_WALLET_PUBKEY", &mut self.party_id),
            ("VEGAMM_BINANCE_MARKET", &mut self.reference_symbol),
            ("VEGAMM_BINANCE_WS_URL", &mut self.reference_ws_url),
            ("VEGAMM_WALLET_URL", &mut self.wallet.url),
            ("VEGAMM_WALLET_TOKEN", &mut self.wallet.token),
        ];
        for (key, field) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    /// Reject configurations the agent cannot start with.
    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("market_id", &self.market_id),
            ("party_id", &self.party_id),
            ("reference_symbol", &self.reference_symbol),
            ("datanode_url", &self.datanode_url),
            ("wallet.url", &self.wallet.url),
            ("wallet.token", &self.wallet.token),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        let s = &self.strategy;
        for (name, value) in [
            ("strategy.quote_fraction", s.quote_fraction),
            ("strategy.commitment_fraction", s.commitment_fraction),
        ] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(AppError::Config(format!("{name} must be in (0, 1], got {value}")));
            }
        }
        if s.fee < Decimal::ZERO {
            return Err(AppError::Config(format!("strategy.fee must not be negative, got {}", s.fee)));
        }
        if s.num_levels == 0 {
            return Err(AppError::Config("strategy.num_levels must be positive".to_string()));
        }
        if s.tick_interval_ms == 0 {
            return Err(AppError::Config("strategy.tick_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Websocket base URL of the data node.
    pub fn datanode_ws_base(&self) -> String {
        self.datanode_ws_url
            .clone()
            .unwrap_or_else(|| vmm_datanode::ws_base_from_rest(&self.datanode_url))
    }

    /// Connection settings common to every stream; the URL is left empty.
    pub fn connection_template(&self) -> ConnectionConfig {
        self.websocket.clone().into()
    }
}
