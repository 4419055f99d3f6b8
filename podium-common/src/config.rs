//! Configuration loading and storage root resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Storage root resolution priority order:
/// 1. Environment variable (highest priority)
/// 2. TOML config file (`storage_root` key)
/// 3. OS-dependent compiled default (fallback)
pub fn resolve_storage_root(env_var_name: &str, service_name: &str) -> PathBuf {
    // Priority 1: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 2: TOML config file
    if let Ok(config_path) = config_file_path() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root) = config.get("storage_root").and_then(|v| v.as_str()) {
                    return PathBuf::from(root);
                }
            }
        }
    }

    // Priority 3: OS-dependent default
    default_storage_root(service_name)
}

/// Get default configuration file path for the platform
pub fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("podium").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    let system_config = PathBuf::from("/etc/podium/config.toml");
    if system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Default storage root: `<platform data dir>/podium/<service>`
fn default_storage_root(service_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("podium")
        .join(service_name)
}

/// Create the storage root directory (and parents) if missing
pub fn ensure_directory(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        tracing::info!("Created storage root: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_root_includes_service_name() {
        let root = default_storage_root("assess");
        assert!(root.ends_with("podium/assess") || root.to_string_lossy().contains("assess"));
    }

    #[test]
    fn ensure_directory_creates_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("root");
        ensure_directory(&target).unwrap();
        assert!(target.is_dir());
    }
}
