//! Configuration for podium-assess
//!
//! Settings resolve in priority order: environment variable, then the
//! service TOML file (`~/.config/podium/assess.toml`), then compiled
//! defaults. The storage root follows the shared resolution in
//! podium-common (PODIUM_ROOT → config file → platform data dir).

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default upload ceiling: 500 MiB (matches the largest accepted video)
const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Recommended chunk size advertised to clients: 5 MiB
const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

/// Request body ceiling for a single chunk: recommended size plus headroom
const DEFAULT_MAX_CHUNK_BYTES: usize = 8 * 1024 * 1024;

/// Service configuration
#[derive(Debug, Clone)]
pub struct AssessConfig {
    /// HTTP listen port
    pub port: u16,
    /// Storage root (database, chunk staging, reassembled uploads)
    pub storage_root: PathBuf,
    /// Maximum declared upload size in bytes
    pub max_file_size: u64,
    /// Accepted filename extensions (lowercase, without dot)
    pub allowed_extensions: Vec<String>,
    /// Chunk size recommended to clients in the init response
    pub recommended_chunk_size: u64,
    /// Request body limit for a single chunk upload
    pub max_chunk_bytes: usize,
    /// Hours before an ACTIVE session is eligible for expiry
    pub session_ttl_hours: i64,
    /// Number of pipeline workers draining the assessment queue
    pub pipeline_workers: usize,
    /// Bounded capacity of the assessment queue
    pub queue_capacity: usize,
    /// Per-stage analyzer call timeout in seconds
    pub stage_timeout_secs: u64,
    /// Audio analysis service base URL
    pub audio_analyzer_url: String,
    /// Visual analysis service base URL
    pub visual_analyzer_url: String,
    /// Narrative analysis service base URL
    pub narrative_analyzer_url: String,
    /// Report LLM API base URL (OpenAI-compatible)
    pub report_api_url: String,
    /// Report LLM API key (report generation degrades to template without it)
    pub report_api_key: Option<String>,
    /// Report LLM model name
    pub report_model: String,
}

/// Optional overrides read from the service TOML file
#[derive(Debug, Default, Deserialize)]
struct TomlOverrides {
    port: Option<u16>,
    max_file_size: Option<u64>,
    allowed_extensions: Option<Vec<String>>,
    session_ttl_hours: Option<i64>,
    pipeline_workers: Option<usize>,
    queue_capacity: Option<usize>,
    stage_timeout_secs: Option<u64>,
    audio_analyzer_url: Option<String>,
    visual_analyzer_url: Option<String>,
    narrative_analyzer_url: Option<String>,
    report_api_url: Option<String>,
    report_api_key: Option<String>,
    report_model: Option<String>,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            port: 5870,
            storage_root: PathBuf::from("."),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["mp4".to_string(), "mov".to_string()],
            recommended_chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            session_ttl_hours: 24,
            pipeline_workers: 2,
            queue_capacity: 16,
            stage_timeout_secs: 300,
            audio_analyzer_url: "http://127.0.0.1:5871".to_string(),
            visual_analyzer_url: "http://127.0.0.1:5872".to_string(),
            narrative_analyzer_url: "http://127.0.0.1:5873".to_string(),
            report_api_url: "https://api.openai.com/v1".to_string(),
            report_api_key: None,
            report_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl AssessConfig {
    /// Load configuration: defaults, TOML overlay, then environment overrides
    pub fn load() -> Self {
        let mut config = Self::default();
        config.storage_root = podium_common::config::resolve_storage_root("PODIUM_ROOT", "assess");

        config.apply_toml();
        config.apply_env();
        config
    }

    fn apply_toml(&mut self) {
        let toml_path = service_toml_path();
        if !toml_path.exists() {
            return;
        }
        let overrides: TomlOverrides = match std::fs::read_to_string(&toml_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Failed to parse {}: {}", toml_path.display(), e);
                    return;
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", toml_path.display(), e);
                return;
            }
        };
        info!("Loaded configuration overrides from {}", toml_path.display());

        if let Some(v) = overrides.port {
            self.port = v;
        }
        if let Some(v) = overrides.max_file_size {
            self.max_file_size = v;
        }
        if let Some(v) = overrides.allowed_extensions {
            self.allowed_extensions = v.into_iter().map(|e| e.to_ascii_lowercase()).collect();
        }
        if let Some(v) = overrides.session_ttl_hours {
            self.session_ttl_hours = v;
        }
        if let Some(v) = overrides.pipeline_workers {
            self.pipeline_workers = v.max(1);
        }
        if let Some(v) = overrides.queue_capacity {
            self.queue_capacity = v.max(1);
        }
        if let Some(v) = overrides.stage_timeout_secs {
            self.stage_timeout_secs = v;
        }
        if let Some(v) = overrides.audio_analyzer_url {
            self.audio_analyzer_url = v;
        }
        if let Some(v) = overrides.visual_analyzer_url {
            self.visual_analyzer_url = v;
        }
        if let Some(v) = overrides.narrative_analyzer_url {
            self.narrative_analyzer_url = v;
        }
        if let Some(v) = overrides.report_api_url {
            self.report_api_url = v;
        }
        if let Some(v) = overrides.report_api_key {
            self.report_api_key = Some(v);
        }
        if let Some(v) = overrides.report_model {
            self.report_model = v;
        }
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse::<u16>("PODIUM_ASSESS_PORT") {
            self.port = v;
        }
        if let Some(v) = env_parse::<u64>("PODIUM_MAX_FILE_SIZE") {
            self.max_file_size = v;
        }
        if let Some(v) = env_parse::<u64>("PODIUM_STAGE_TIMEOUT_SECS") {
            self.stage_timeout_secs = v;
        }
        if let Some(v) = env_parse::<usize>("PODIUM_PIPELINE_WORKERS") {
            self.pipeline_workers = v.max(1);
        }
        if let Some(v) = env_parse::<usize>("PODIUM_QUEUE_CAPACITY") {
            self.queue_capacity = v.max(1);
        }
        if let Ok(v) = std::env::var("PODIUM_AUDIO_ANALYZER_URL") {
            self.audio_analyzer_url = v;
        }
        if let Ok(v) = std::env::var("PODIUM_VISUAL_ANALYZER_URL") {
            self.visual_analyzer_url = v;
        }
        if let Ok(v) = std::env::var("PODIUM_NARRATIVE_ANALYZER_URL") {
            self.narrative_analyzer_url = v;
        }
        if let Ok(v) = std::env::var("PODIUM_REPORT_API_URL") {
            self.report_api_url = v;
        }
        if let Ok(v) = std::env::var("PODIUM_REPORT_API_KEY") {
            if !v.trim().is_empty() {
                self.report_api_key = Some(v);
            }
        }
        if let Ok(v) = std::env::var("PODIUM_REPORT_MODEL") {
            self.report_model = v;
        }
    }

    /// SQLite database path inside the storage root
    pub fn database_path(&self) -> PathBuf {
        self.storage_root.join("podium.db")
    }

    /// Chunk staging directory (one subdirectory per upload session)
    pub fn chunk_dir(&self) -> PathBuf {
        self.storage_root.join("chunks")
    }

    /// Directory for reassembled upload files awaiting analysis
    pub fn uploads_dir(&self) -> PathBuf {
        self.storage_root.join("uploads")
    }

    /// Whether the filename carries an accepted extension
    pub fn is_allowed_filename(&self, filename: &str) -> bool {
        std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| a == &ext)
            })
            .unwrap_or(false)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring unparseable {}: {:?}", name, raw);
                None
            }
        },
        Err(_) => None,
    }
}

/// Path of the service-specific TOML override file
fn service_toml_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("podium")
        .join("assess.toml")
}
