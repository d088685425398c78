use anyhow::Result;
use chargeguard::clock::SystemClock;
use chargeguard::config::Config;
use chargeguard::controller::{Controller, ReplaySource};
use chargeguard::logging::init_logging;
use chargeguard::resolver::StateResolver;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{error, info};

const USAGE: &str = "usage: chargeguard <ticks.jsonl> [config.yaml]";

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let ticks_path = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?;

    let config = match args.next() {
        Some(path) => Config::from_file(&path),
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_logging(&config.logging)?;
    info!("Chargeguard {} starting up", env!("APP_VERSION"));

    let clock = SystemClock::from_timezone(&config.timezone)?;
    let resolver = StateResolver::from_config(&config.resolver, Arc::new(clock))?;
    let source = ReplaySource::open(&ticks_path).await?;
    info!("Replaying {} ticks from {}", source.remaining(), ticks_path);

    let mut controller = Controller::new(resolver, Box::new(source));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping");
            let _ = shutdown_tx.send(true);
        }
    });

    match controller
        .run(Duration::from_millis(config.poll_interval_ms), shutdown_rx)
        .await
    {
        Ok(()) => {
            info!("Chargeguard shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("Tick loop failed with error: {}", e);
            Err(anyhow::anyhow!("Tick loop error: {}", e))
        }
    }
}
