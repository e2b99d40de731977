//! Config file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::env::resolve_env_vars;
use crate::schema::Config;

/// Default config file name, looked up in the working directory.
const CONFIG_FILE_NAME: &str = "bibtag.yaml";

/// Resolve the config file path.
/// Priority: `BIBTAG_CONFIG` env > `./bibtag.yaml`.
pub fn default_config_path() -> PathBuf {
    std::env::var("BIBTAG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME))
}

/// Load and parse the YAML config, substituting `${VAR}` references.
///
/// Returns `Ok(Config::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<Config> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<Config> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    let value: serde_json::Value = serde_yaml::from_str(raw)?;
    let value = resolve_env_vars(&value)?;
    Ok(serde_json::from_value(value)?)
}
