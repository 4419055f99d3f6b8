//! Upload session persistence
//!
//! Session state is stored as its serde representation in a TEXT column;
//! received chunk indices are rows of upload_chunks keyed by
//! (session_id, chunk_index), so re-receipt of an index collapses by
//! primary key and the set invariant holds in storage.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::{UploadSession, UploadState};
use podium_common::{Error, Result};

/// Insert a newly created session
pub async fn insert_session(pool: &SqlitePool, session: &UploadSession) -> Result<()> {
    let state = serde_json::to_string(&session.state)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO upload_sessions (
            session_id, filename, file_size, total_chunks,
            state, created_at, expires_at, ended_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.session_id.to_string())
    .bind(&session.filename)
    .bind(session.file_size as i64)
    .bind(session.total_chunks as i64)
    .bind(state)
    .bind(session.created_at.to_rfc3339())
    .bind(session.expires_at.map(|dt| dt.to_rfc3339()))
    .bind(session.ended_at.map(|dt| dt.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a session together with its received chunk index set
pub async fn load_session(pool: &SqlitePool, session_id: Uuid) -> Result<Option<UploadSession>> {
    let session_id_str = session_id.to_string();

    let row = sqlx::query(
        r#"
        SELECT session_id, filename, file_size, total_chunks,
               state, created_at, expires_at, ended_at
        FROM upload_sessions
        WHERE session_id = ?
        "#,
    )
    .bind(&session_id_str)
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let state: String = row.get("state");
    let state: UploadState = serde_json::from_str(&state)
        .map_err(|e| Error::Internal(format!("Failed to deserialize state: {}", e)))?;

    let created_at = parse_timestamp(row.get("created_at"))?;
    let expires_at = parse_optional_timestamp(row.get("expires_at"))?;
    let ended_at = parse_optional_timestamp(row.get("ended_at"))?;

    let indices: Vec<i64> = sqlx::query_scalar(
        "SELECT chunk_index FROM upload_chunks WHERE session_id = ? ORDER BY chunk_index",
    )
    .bind(&session_id_str)
    .fetch_all(pool)
    .await?;

    let received: BTreeSet<u32> = indices.into_iter().map(|i| i as u32).collect();

    Ok(Some(UploadSession {
        session_id,
        filename: row.get("filename"),
        file_size: row.get::<i64, _>("file_size") as u64,
        total_chunks: row.get::<i64, _>("total_chunks") as u32,
        state,
        received,
        created_at,
        expires_at,
        ended_at,
    }))
}

/// Load only the session's current state
pub async fn session_state(pool: &SqlitePool, session_id: Uuid) -> Result<Option<UploadState>> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT state FROM upload_sessions WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_optional(pool)
            .await?;

    raw.map(|s| {
        serde_json::from_str(&s)
            .map_err(|e| Error::Internal(format!("Failed to deserialize state: {}", e)))
    })
    .transpose()
}

/// Record receipt of a chunk index and return the distinct received count
///
/// Re-receipt of an index updates the existing row; the count is
/// unchanged (idempotent re-upload).
pub async fn record_chunk(
    pool: &SqlitePool,
    session_id: Uuid,
    chunk_index: u32,
    byte_size: usize,
) -> Result<u32> {
    let session_id_str = session_id.to_string();

    sqlx::query(
        r#"
        INSERT INTO upload_chunks (session_id, chunk_index, byte_size, received_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(session_id, chunk_index) DO UPDATE SET
            byte_size = excluded.byte_size,
            received_at = excluded.received_at
        "#,
    )
    .bind(&session_id_str)
    .bind(chunk_index as i64)
    .bind(byte_size as i64)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM upload_chunks WHERE session_id = ?")
        .bind(&session_id_str)
        .fetch_one(pool)
        .await?;

    Ok(count as u32)
}

/// Attempt a guarded one-way transition out of ACTIVE
///
/// Returns false when the session was not ACTIVE (already terminal or
/// transitioned concurrently); the caller decides whether that is an
/// error.
pub async fn transition_from_active(
    pool: &SqlitePool,
    session_id: Uuid,
    to: UploadState,
) -> Result<bool> {
    let state = serde_json::to_string(&to)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;

    let result = sqlx::query(
        r#"
        UPDATE upload_sessions
        SET state = ?, ended_at = ?
        WHERE session_id = ? AND state = '"ACTIVE"'
        "#,
    )
    .bind(state)
    .bind(Utc::now().to_rfc3339())
    .bind(session_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete all chunk receipt rows for a session
pub async fn delete_chunks(pool: &SqlitePool, session_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM upload_chunks WHERE session_id = ?")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Expire ACTIVE sessions whose staleness window has elapsed
///
/// Any session still ACTIVE past expires_at is from an abandoned upload
/// and will never complete. Returns the ids transitioned so the caller
/// can remove their chunk directories.
pub async fn expire_stale_sessions(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let now = Utc::now().to_rfc3339();

    let rows: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT session_id FROM upload_sessions
        WHERE state = '"ACTIVE"' AND expires_at IS NOT NULL AND expires_at < ?
        "#,
    )
    .bind(&now)
    .fetch_all(pool)
    .await?;

    let mut expired = Vec::with_capacity(rows.len());
    for id_str in rows {
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Failed to parse session_id: {}", e)))?;
        if transition_from_active(pool, id, UploadState::Expired).await? {
            delete_chunks(pool, id).await?;
            expired.push(id);
        }
    }

    Ok(expired)
}

fn parse_timestamp(raw: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp: {}", e)))
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_optional_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.map(parse_timestamp).transpose()
}
