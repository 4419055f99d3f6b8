//! podium-assess library interface
//!
//! Exposes the application state, router assembly and bootstrap wiring
//! for the binary and for integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scoring;
pub mod services;
pub mod upload;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AssessConfig;
use crate::services::Stages;
use crate::upload::UploadManager;
use crate::workflow::{PipelineHandle, PipelineOrchestrator};
use podium_common::events::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service configuration
    pub config: Arc<AssessConfig>,
    /// Upload session manager
    pub uploads: Arc<UploadManager>,
    /// Pipeline queue submission handle
    pub pipeline: PipelineHandle,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

/// Wire up the full application: database, startup recovery, upload
/// manager, pipeline workers
///
/// The stage adapters are injected so tests can run the pipeline against
/// mocks; the binary passes `Stages::from_config`.
pub async fn bootstrap(config: AssessConfig, stages: Stages) -> anyhow::Result<AppState> {
    let config = Arc::new(config);

    podium_common::config::ensure_directory(&config.storage_root)?;

    let db = db::init_database_pool(&config.database_path()).await?;

    // Startup recovery: work interrupted by the previous process will
    // never finish on its own
    let failed = db::assessments::fail_interrupted(&db).await?;
    if failed > 0 {
        tracing::warn!(count = failed, "Marked interrupted assessments as failed");
    }

    let event_bus = EventBus::new(100);

    let uploads = Arc::new(UploadManager::new(db.clone(), config.clone()));
    let expired = uploads.expire_stale().await?;
    if expired > 0 {
        tracing::info!(count = expired, "Expired stale upload sessions");
    }

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        db.clone(),
        event_bus.clone(),
        stages,
        Duration::from_secs(config.stage_timeout_secs),
    ));
    let pipeline = workflow::spawn_workers(
        orchestrator,
        config.pipeline_workers,
        config.queue_capacity,
    );

    Ok(AppState {
        db,
        event_bus,
        config,
        uploads,
        pipeline,
        startup_time: Utc::now(),
        last_error: Arc::new(RwLock::new(None)),
    })
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let max_chunk_bytes = state.config.max_chunk_bytes;

    Router::new()
        .merge(api::upload_routes(max_chunk_bytes))
        .merge(api::assessment_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
