use anyhow::Context;
use clap::Parser;
use lumen::{cli::Cli, MqttConnector};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lumen=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Cli::parse().into_config();
    config.validate().context("invalid sensor configuration")?;

    info!("Lumen v{} starting", lumen::VERSION);

    match lumen::run(config, MqttConnector, shutdown_signal()).await {
        Ok(stats) => {
            info!("Sensor stopped after {} readings", stats.cycles);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Resolves on Ctrl-C. The handler lives on its own task so it is installed
/// at the first await of the connect, not when the loop first waits. If it
/// cannot be installed the sensor runs until killed.
fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    let ctrl_c = tokio::spawn(tokio::signal::ctrl_c());
    async move {
        match ctrl_c.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            Err(e) => {
                error!("Ctrl-C listener stopped: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
