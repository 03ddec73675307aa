// src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

use accstorage::cli::Cli;
use accstorage::config::{AppConfig, LoggingConfig};

/// Уровень из конфигурации, RUST_LOG имеет приоритет
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.enable_json_output {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_logging(&config.logging);

    tracing::info!(config = %cli.config, "starting accstorage");
    cli.run(config).await
}
