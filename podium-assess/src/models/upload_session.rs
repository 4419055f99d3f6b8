//! Chunked upload session state machine
//!
//! A session tracks one in-progress chunked upload: the declared shape of
//! the file, the set of chunk indices received so far, and a one-way
//! lifecycle ACTIVE → {COMPLETED, CANCELLED, EXPIRED}.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Upload session state
///
/// Transitions are one-way: once a session leaves ACTIVE it never
/// re-activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UploadState {
    /// Accepting chunks
    Active,
    /// All chunks received and reassembled
    Completed,
    /// Cancelled by the client
    Cancelled,
    /// Staleness window elapsed before completion
    Expired,
}

impl UploadState {
    /// Check if the state is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadState::Active)
    }
}

/// Upload session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Unique session identifier (opaque to the caller)
    pub session_id: Uuid,

    /// Client-supplied filename (validated for extension only)
    pub filename: String,

    /// Declared total size in bytes
    pub file_size: u64,

    /// Declared number of chunks
    pub total_chunks: u32,

    /// Current lifecycle state
    pub state: UploadState,

    /// Chunk indices received so far (set semantics; duplicates collapse)
    pub received: BTreeSet<u32>,

    /// Session creation time
    pub created_at: DateTime<Utc>,

    /// When an ACTIVE session becomes eligible for expiry
    pub expires_at: Option<DateTime<Utc>>,

    /// When the session reached a terminal state
    pub ended_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    /// Create a new ACTIVE session
    pub fn new(filename: String, file_size: u64, total_chunks: u32, ttl_hours: i64) -> Self {
        let created_at = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            filename,
            file_size,
            total_chunks,
            state: UploadState::Active,
            received: BTreeSet::new(),
            created_at,
            expires_at: Some(created_at + Duration::hours(ttl_hours)),
            ended_at: None,
        }
    }

    /// Number of distinct chunk indices received
    pub fn received_count(&self) -> u32 {
        self.received.len() as u32
    }

    /// Chunk indices not yet received, in ascending order
    pub fn missing_indices(&self) -> Vec<u32> {
        (0..self.total_chunks)
            .filter(|i| !self.received.contains(i))
            .collect()
    }

    /// Check if the session is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Transition to a new state, stamping ended_at for terminal states
    pub fn transition_to(&mut self, new_state: UploadState) {
        self.state = new_state;
        if new_state.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Filename extension including the leading dot ("" when absent)
    pub fn file_extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }
}
