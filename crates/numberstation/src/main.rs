//! Numberstation - Art-Net number display
//!
//! Usage: `numberstation [config.json|config.ron]`

mod logging_setup;

use std::path::PathBuf;

use anyhow::{Context, Result};
use numberstation_control::{Station, StationConfig};
use tracing::info;

fn load_config() -> Result<StationConfig> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => StationConfig::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(StationConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    logging_setup::init(&config.log)?;

    let station = Station::new(config).context("Failed to set up station")?;
    station.start();
    info!("Numberstation running, press Ctrl+C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Shutting down");
    station.shutdown().await;
    Ok(())
}
