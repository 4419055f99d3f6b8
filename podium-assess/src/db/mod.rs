//! Database access for podium-assess
//!
//! Upload sessions, chunk receipts and assessments live in a SQLite
//! database under the storage root, so state survives restarts and is
//! visible to every worker.

pub mod assessments;
pub mod sessions;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Initialize podium-assess tables
///
/// Creates upload_sessions, upload_chunks and assessments tables if they
/// don't exist.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS upload_sessions (
            session_id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            total_chunks INTEGER NOT NULL,
            state TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            ended_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Receipt bookkeeping only; chunk bytes live on disk keyed by the same pair
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS upload_chunks (
            session_id TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            byte_size INTEGER NOT NULL,
            received_at TEXT NOT NULL,
            PRIMARY KEY (session_id, chunk_index)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assessments (
            assessment_id TEXT PRIMARY KEY,
            state TEXT NOT NULL,
            progress INTEGER NOT NULL DEFAULT 0,
            message TEXT NOT NULL DEFAULT '',
            error TEXT,
            report TEXT,
            source_filename TEXT NOT NULL,
            created_at TEXT NOT NULL,
            ended_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (upload_sessions, upload_chunks, assessments)");

    Ok(())
}
