//! # leasehold-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment
//! (`PORT`, `AUTH_TOKEN`, `SEED_FILE`, `PAYMENT_REPORT_MONTHS`).

use leasehold_api::state::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::debug!(?config, "configuration loaded");
    let port = config.port;

    let state = leasehold_api::bootstrap::bootstrap(config).map_err(|e| {
        tracing::error!("Bootstrap failed: {e}");
        e
    })?;

    let app = leasehold_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("leasehold API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
