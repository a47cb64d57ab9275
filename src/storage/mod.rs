//! Storage Layer
//!
//! Platform directories for the configuration file and model files.
//! Sales are never persisted.

use anyhow::Result;
use std::path::PathBuf;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "cashiervision", "CashierVision")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Resolve a model path: absolute or existing relative paths are kept,
/// bare names fall back to `<data dir>/models/<name>`
pub fn resolve_model_path(configured: &std::path::Path) -> PathBuf {
    if configured.is_absolute() || configured.exists() {
        return configured.to_path_buf();
    }

    match get_data_dir() {
        Ok(dir) => {
            let candidate = dir.join("models").join(configured);
            if candidate.exists() {
                candidate
            } else {
                configured.to_path_buf()
            }
        }
        Err(_) => configured.to_path_buf(),
    }
}
