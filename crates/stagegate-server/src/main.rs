//! stagegate HTTP Server
//!
//! Provides the REST API for evaluating and administering feature gates.

use anyhow::Result;
use stagegate_server::{api, config::ServerConfig, engine};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing
    init_tracing(&config)?;
    info!("Loaded configuration: {:?}", config);

    // Initialize feature gate
    let gate = engine::init_gate(&config).await?;

    let app = api::create_router(Arc::new(gate));

    // Start server
    let addr = config.addr();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{} ({})", addr, config.environment);
    info!("  Health check: http://{}/health", addr);
    info!("  Evaluate API: http://{}/v1/evaluate", addr);
    info!("  Parameters:   http://{}/v1/parameters", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize tracing subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(config: &ServerConfig) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
