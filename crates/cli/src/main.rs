//! jsonproxy: a filtering reverse proxy for JSON APIs
use anyhow::{Context, Result};
use clap::Parser;
use jsonproxy_config::Settings;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Filtering reverse proxy that narrows a JSON API to role-bound capability keys"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.settings.log_level)?;

    let config = cli
        .settings
        .resolve()
        .context("Invalid jsonproxy configuration")?;
    let server = Arc::new(jsonproxy_server::build(config)?);

    info!("Starting jsonproxy on {}", server.listen_addr());
    server.serve(shutdown_signal()).await?;

    Ok(())
}

/// RUST_LOG wins over the configured level
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .with_context(|| format!("Invalid log level '{log_level}'"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Unable to install the tracing subscriber")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining connections"),
        Err(e) => {
            error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
