use anyhow::{Context, Result};
use numberstation_control::LogConfig;

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Initialize the logging system
pub fn init(config: &LogConfig) -> Result<()> {
    // Parse level from config (defaulting to INFO if invalid)
    let filter = EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy(); // RUST_LOG env var takes precedence

    let console_layer = if config.console_output {
        Some(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!("Logging initialized at level: {}", config.level);
    Ok(())
}
