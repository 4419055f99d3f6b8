//! podium-assess - Presentation Assessment Service
//!
//! Receives presentation videos over chunked upload, runs the analysis
//! pipeline (audio, visual, narrative) against the external analyzers,
//! and serves the scored coaching report.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use podium_assess::config::AssessConfig;
use podium_assess::services::Stages;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting podium-assess (Presentation Assessment Service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = AssessConfig::load();
    info!("Storage root: {}", config.storage_root.display());
    info!("Database: {}", config.database_path().display());

    let port = config.port;
    let stages =
        Stages::from_config(&config).map_err(|e| anyhow::anyhow!("Stage setup failed: {}", e))?;

    let state = podium_assess::bootstrap(config, stages).await?;
    let app = podium_assess::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
