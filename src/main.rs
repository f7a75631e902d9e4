use anyhow::Result;
use tokio::signal;
use tracing::info;

mod config;
mod engine;
mod logfile;
mod models;
mod probe;
mod sink;
mod utils;

use crate::config::MonitorConfig;
use crate::engine::Monitor;
use crate::sink::TracingSink;

#[tokio::main]
async fn main() -> Result<()> {
    utils::setup_console();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_ansi(true)
        .init();

    let config = MonitorConfig::load("config.json")?;
    let monitor = Monitor::new(config, Box::new(TracingSink))?;

    tokio::select! {
        res = monitor.run() => res?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received. Closing monitor...");
        }
    }

    Ok(())
}
