//! Vega liquidity-providing market maker - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

/// Vega liquidity-providing market maker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via VEGAMM_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = vmm_telemetry::DEFAULT_FILTER)]
    log_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    vmm_ws::init_crypto();

    let args = Args::parse();
    vmm_telemetry::init_logging(&args.log_filter)?;

    info!("Starting vega-mm v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > VEGAMM_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("VEGAMM_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let mut config = vmm_bot::AppConfig::from_file(&config_path)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    info!(
        market = %config.market_id,
        party = %config.party_id,
        reference = %config.reference_symbol,
        datanode = %config.datanode_url,
        "Configuration loaded"
    );

    let app = vmm_bot::Application::new(config)?;
    if let Err(e) = app.run().await {
        error!(error = %e, "Fatal error");
        return Err(e.into());
    }

    Ok(())
}
