//! Fleet live map - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Live vehicle map service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via FLEET_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    fleet_telemetry::init_logging()?;

    info!("Starting fleet-live v{}", env!("CARGO_PKG_VERSION"));

    let config = fleet_live::AppConfig::load(args.config)?;
    info!(
        port = config.dashboard.port,
        update_interval_ms = config.dashboard.update_interval_ms,
        "Configuration loaded"
    );

    let app = fleet_live::Application::new(config)?;
    app.run().await?;

    Ok(())
}
