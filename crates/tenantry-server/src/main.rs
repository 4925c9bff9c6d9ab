//! Tenantry Server: Application entry point.

use clap::Parser;
use tenantry_server::{AppContext, Config, router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments use the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tenantry=info".parse()?))
        .json()
        .init();

    let config = Config::parse();
    tracing::info!(addr = %config.bind_addr(), "Starting Tenantry server...");

    let context = AppContext::build(&config).await?;
    context.spawn_cache_purge();

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(context.state()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Tenantry server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
