//! Chunk byte persistence and reassembly
//!
//! Chunk bytes are stored one file per index under a per-session
//! directory (`chunk_0007` naming). Reassembly walks indices strictly in
//! order 0..N-1 regardless of arrival order; a failed assembly removes
//! its partial output before returning.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Append-only chunk storage rooted at one staging directory
#[derive(Debug, Clone)]
pub struct ChunkStore {
    root: PathBuf,
}

impl ChunkStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Per-session chunk directory
    pub fn session_dir(&self, session_id: Uuid) -> PathBuf {
        self.root.join(session_id.to_string())
    }

    fn chunk_path(&self, session_id: Uuid, index: u32) -> PathBuf {
        self.session_dir(session_id).join(format!("chunk_{:04}", index))
    }

    /// Create the session's chunk directory (and the staging root if missing)
    pub async fn create_session_dir(&self, session_id: Uuid) -> io::Result<()> {
        fs::create_dir_all(self.session_dir(session_id)).await
    }

    /// Write one chunk's bytes, overwriting any previous bytes at the index
    pub async fn write_chunk(&self, session_id: Uuid, index: u32, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.chunk_path(session_id, index), bytes).await
    }

    /// Concatenate chunks 0..total_chunks in index order into `dest`
    ///
    /// Either produces a fully valid file or none: any failure removes the
    /// partial output before the error propagates.
    pub async fn assemble(
        &self,
        session_id: Uuid,
        total_chunks: u32,
        dest: &Path,
    ) -> io::Result<()> {
        match self.assemble_inner(session_id, total_chunks, dest).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if let Err(cleanup_err) = fs::remove_file(dest).await {
                    if cleanup_err.kind() != io::ErrorKind::NotFound {
                        tracing::warn!(
                            dest = %dest.display(),
                            error = %cleanup_err,
                            "Failed to remove partial reassembly output"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    async fn assemble_inner(
        &self,
        session_id: Uuid,
        total_chunks: u32,
        dest: &Path,
    ) -> io::Result<()> {
        let mut out = fs::File::create(dest).await?;

        for index in 0..total_chunks {
            let bytes = fs::read(self.chunk_path(session_id, index)).await?;
            out.write_all(&bytes).await?;
        }

        out.flush().await?;
        out.sync_all().await?;
        Ok(())
    }

    /// Remove the session's chunk directory and everything in it
    pub async fn remove_session_dir(&self, session_id: Uuid) -> io::Result<()> {
        let dir = self.session_dir(session_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
