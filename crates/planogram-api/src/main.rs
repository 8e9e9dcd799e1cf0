use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod routes;
mod service;

use config::ApiConfig;
use service::PlanogramService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Planogram API");

    let config = ApiConfig::from_env()?;
    let service = Arc::new(PlanogramService::new(&config));
    let app = routes::router(service);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.addr))?;

    info!("API server listening on http://{}", config.addr);
    info!("Try: curl http://localhost:{}/api/health", config.addr.port());

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
