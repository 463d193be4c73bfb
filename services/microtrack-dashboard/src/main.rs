//! MicroTrack dashboard CLI
//!
//! Command-line interface for the plant growth telemetry dashboard.

use std::path::PathBuf;

use clap::Parser;
use microtrack_dashboard::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "microtrack-dashboard")]
#[command(about = "Plant growth telemetry table and analytics dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Data API base URL (overrides config file)
    #[arg(long)]
    api_base_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, api_base_url={:?}, log_level={:?}",
        args.config,
        args.port,
        args.api_base_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(base_url) = args.api_base_url {
        config.api.base_url = base_url;
    }

    tracing::info!("Starting MicroTrack dashboard");
    tracing::debug!(
        "Data API: {}, session guard: {}",
        config.api.plants_url(),
        if config.session.enabled { "on" } else { "off" }
    );

    microtrack_dashboard::run(config).await?;

    Ok(())
}
