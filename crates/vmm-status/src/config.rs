//! Status server configuration.

use serde::{Deserialize, Serialize};

/// Status server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Enable the status server.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Answer CORS preflights from any origin.
    #[serde(default = "default_cors_any_origin")]
    pub cors_any_origin: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_any_origin() -> bool {
    true
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_host(),
            port: default_port(),
            cors_any_origin: default_cors_any_origin(),
        }
    }
}

impl StatusConfig {
    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
