use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use financing_facility_rs::api::{self, AppState};
use financing_facility_rs::{FinancingConfig, MemoryStore, SafeTimeProvider, TimeSource};

#[derive(Parser)]
#[command(name = "financing-api")]
#[command(about = "Installment financing HTTP service")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "FINANCING_CONFIG")]
    config: Option<PathBuf>,

    /// override the configured listen address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = FinancingConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    let store = MemoryStore::seeded(SafeTimeProvider::new(TimeSource::System)).context("seeding store")?;
    let bind_address = config.server.bind_address.clone();
    tracing::info!(
        margin_rate = %config.margin_rate,
        tenors = ?config.allowed_tenors.allowed(),
        "financing service configured"
    );

    let app = api::router(AppState::from_store(store, config));
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {}", bind_address))?;
    tracing::info!(address = %bind_address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
