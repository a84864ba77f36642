//! telemetry-relay server entry point.
//!
//! Starts the Axum server with the message-stream and REST endpoints.

use tracing_subscriber::EnvFilter;

use telemetry_relay::app_state::AppState;
use telemetry_relay::config::{LogFormat, RelayConfig};
use telemetry_relay::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        enrichment_url = %config.enrichment_url,
        enrichment_timeout = ?config.enrichment_timeout,
        "starting telemetry-relay"
    );

    // Build application state
    let app_state = AppState::new(&config)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    server::serve(listener, app_state).await?;

    Ok(())
}
