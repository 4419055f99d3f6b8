//! Chunked upload session management
//!
//! Owns the upload session state machine: init → chunk receipt →
//! complete/cancel, with receipts and lifecycle in the database and chunk
//! bytes in the staging directory. Chunk byte writes for distinct indices
//! proceed in parallel; receipt bookkeeping and the complete/cancel
//! check-and-transition serialize through a per-session lock so complete
//! never observes a torn received set.

pub mod chunk_store;

pub use chunk_store::ChunkStore;

use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AssessConfig;
use crate::db;
use crate::models::{UploadSession, UploadState};

/// Ceiling on the declared chunk count; rejects absurd init requests
/// before they allocate anything
const MAX_TOTAL_CHUNKS: u32 = 10_000;

/// Upload session errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filename extension not in the accepted set
    #[error("Unsupported file type: {0} (only MP4 and MOV files are supported)")]
    InvalidFileType(String),

    /// Declared size exceeds the configured ceiling
    #[error("File size {size} exceeds the limit of {max} bytes")]
    FileTooLarge {
        /// Declared size
        size: u64,
        /// Configured ceiling
        max: u64,
    },

    /// Declared chunk count is zero or implausibly large
    #[error("Invalid chunk count: {0}")]
    InvalidChunkCount(u32),

    /// No session with this id
    #[error("Upload session not found: {0}")]
    SessionNotFound(Uuid),

    /// Session already reached a terminal state
    #[error("Upload session is {state:?} and no longer accepts requests")]
    SessionNotActive {
        /// The terminal state observed
        state: UploadState,
    },

    /// Chunk index outside [0, total_chunks)
    #[error("Invalid chunk index {index} (total chunks: {total})")]
    InvalidChunkIndex {
        /// Offending index
        index: u32,
        /// Declared chunk count
        total: u32,
    },

    /// Received set incomplete at completion time
    #[error("Upload incomplete: {} chunk(s) missing", missing.len())]
    IncompleteUpload {
        /// Exactly the indices never received
        missing: Vec<u32>,
    },

    /// Database error
    #[error(transparent)]
    Storage(#[from] podium_common::Error),

    /// Chunk or reassembly file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished upload ready to hand to the pipeline
#[derive(Debug, Clone)]
pub struct CompletedUpload {
    /// Assessment id allocated for the reassembled file
    pub assessment_id: Uuid,
    /// Reassembled file path; ownership transfers to the caller
    pub file_path: PathBuf,
    /// Original client filename
    pub filename: String,
}

/// Upload session manager
pub struct UploadManager {
    db: SqlitePool,
    chunks: ChunkStore,
    uploads_dir: PathBuf,
    config: Arc<AssessConfig>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UploadManager {
    pub fn new(db: SqlitePool, config: Arc<AssessConfig>) -> Self {
        Self {
            db,
            chunks: ChunkStore::new(config.chunk_dir()),
            uploads_dir: config.uploads_dir(),
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Initialize an upload session
    pub async fn init(
        &self,
        filename: &str,
        file_size: u64,
        total_chunks: u32,
    ) -> Result<UploadSession, UploadError> {
        if !self.config.is_allowed_filename(filename) {
            return Err(UploadError::InvalidFileType(filename.to_string()));
        }
        if file_size > self.config.max_file_size {
            return Err(UploadError::FileTooLarge {
                size: file_size,
                max: self.config.max_file_size,
            });
        }
        if total_chunks == 0 || total_chunks > MAX_TOTAL_CHUNKS {
            return Err(UploadError::InvalidChunkCount(total_chunks));
        }

        let session = UploadSession::new(
            filename.to_string(),
            file_size,
            total_chunks,
            self.config.session_ttl_hours,
        );

        db::sessions::insert_session(&self.db, &session).await?;
        self.chunks.create_session_dir(session.session_id).await?;

        tracing::info!(
            session_id = %session.session_id,
            filename = %session.filename,
            total_chunks = session.total_chunks,
            "Upload session initialized"
        );

        Ok(session)
    }

    /// Store one chunk and record its receipt
    ///
    /// Re-upload of a received index overwrites the bytes and leaves the
    /// received count unchanged. Returns (received_count, total_chunks).
    pub async fn put_chunk(
        &self,
        session_id: Uuid,
        index: u32,
        bytes: &[u8],
    ) -> Result<(u32, u32), UploadError> {
        let session = db::sessions::load_session(&self.db, session_id)
            .await?
            .ok_or(UploadError::SessionNotFound(session_id))?;

        if session.is_terminal() {
            return Err(UploadError::SessionNotActive {
                state: session.state,
            });
        }
        if index >= session.total_chunks {
            return Err(UploadError::InvalidChunkIndex {
                index,
                total: session.total_chunks,
            });
        }

        // Byte writes for distinct indices are independent; only the
        // receipt bookkeeping below serializes.
        self.chunks.write_chunk(session_id, index, bytes).await?;

        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        // State may have changed while the bytes were being written
        match db::sessions::session_state(&self.db, session_id).await? {
            Some(UploadState::Active) => {}
            Some(state) => return Err(UploadError::SessionNotActive { state }),
            None => return Err(UploadError::SessionNotFound(session_id)),
        }

        let received = db::sessions::record_chunk(&self.db, session_id, index, bytes.len()).await?;

        tracing::debug!(
            session_id = %session_id,
            chunk_index = index,
            received,
            total = session.total_chunks,
            "Chunk received"
        );

        Ok((received, session.total_chunks))
    }

    /// Reassemble the file and complete the session
    ///
    /// Chunks concatenate strictly in index order 0..N-1; arrival order is
    /// irrelevant. Ownership of the reassembled file transfers to the
    /// returned CompletedUpload.
    pub async fn complete(&self, session_id: Uuid) -> Result<CompletedUpload, UploadError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let session = db::sessions::load_session(&self.db, session_id)
            .await?
            .ok_or(UploadError::SessionNotFound(session_id))?;

        if session.is_terminal() {
            return Err(UploadError::SessionNotActive {
                state: session.state,
            });
        }

        let missing = session.missing_indices();
        if !missing.is_empty() {
            return Err(UploadError::IncompleteUpload { missing });
        }

        let assessment_id = Uuid::new_v4();
        let dest = self
            .uploads_dir
            .join(format!("{}{}", assessment_id, session.file_extension()));

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        self.chunks
            .assemble(session_id, session.total_chunks, &dest)
            .await?;

        if !db::sessions::transition_from_active(&self.db, session_id, UploadState::Completed)
            .await?
        {
            let _ = tokio::fs::remove_file(&dest).await;
            let state = db::sessions::session_state(&self.db, session_id)
                .await?
                .ok_or(UploadError::SessionNotFound(session_id))?;
            return Err(UploadError::SessionNotActive { state });
        }

        db::sessions::delete_chunks(&self.db, session_id).await?;
        if let Err(e) = self.chunks.remove_session_dir(session_id).await {
            tracing::warn!(
                session_id = %session_id,
                error = %e,
                "Failed to remove chunk directory after completion"
            );
        }
        self.forget_lock(session_id).await;

        tracing::info!(
            session_id = %session_id,
            assessment_id = %assessment_id,
            file = %dest.display(),
            "Upload reassembled"
        );

        Ok(CompletedUpload {
            assessment_id,
            file_path: dest,
            filename: session.filename,
        })
    }

    /// Cancel a session and delete its partial data
    ///
    /// Cancelling an already-terminal session is a no-op success.
    pub async fn cancel(&self, session_id: Uuid) -> Result<(), UploadError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let state = db::sessions::session_state(&self.db, session_id)
            .await?
            .ok_or(UploadError::SessionNotFound(session_id))?;

        if state.is_terminal() {
            return Ok(());
        }

        db::sessions::transition_from_active(&self.db, session_id, UploadState::Cancelled).await?;
        db::sessions::delete_chunks(&self.db, session_id).await?;
        if let Err(e) = self.chunks.remove_session_dir(session_id).await {
            tracing::warn!(
                session_id = %session_id,
                error = %e,
                "Failed to remove chunk directory on cancel"
            );
        }
        self.forget_lock(session_id).await;

        tracing::info!(session_id = %session_id, "Upload session cancelled");

        Ok(())
    }

    /// Startup sweep: expire ACTIVE sessions past their staleness window
    /// and drop their chunk directories
    pub async fn expire_stale(&self) -> podium_common::Result<usize> {
        let expired = db::sessions::expire_stale_sessions(&self.db).await?;
        for session_id in &expired {
            if let Err(e) = self.chunks.remove_session_dir(*session_id).await {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to remove chunk directory for expired session"
                );
            }
        }
        Ok(expired.len())
    }

    async fn session_lock(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn forget_lock(&self, session_id: Uuid) {
        self.locks.lock().await.remove(&session_id);
    }
}
