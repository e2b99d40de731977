//! Environment handling for the run configuration.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values of the YAML file are
//!   substituted at load time (uppercase `[A-Z_][A-Z0-9_]*` names only).
//! - Well-known variables (`OPENAI_API_KEY`, `OLLAMA_URL`, ...) override
//!   whatever the file or the defaults say.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::schema::Config;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for a `${VAR}` reference with no value.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                let child = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }
    let mut missing: Option<String> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        match env.get(&caps[1]) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            }
        }
    });
    if let Some(var_name) = missing {
        bail!(MissingEnvVarError {
            var_name,
            config_path: path.to_string(),
        });
    }
    Ok(substituted.into_owned())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Defaults overridden by the given variables.
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        config.apply_env(env);
        config
    }

    /// Override fields from well-known environment variables. Empty values are ignored.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) {
        let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = get("BIBTAG_SOURCE_DIR") {
            self.source_dir = PathBuf::from(v);
        }
        if let Some(v) = get("BIBTAG_OUTPUT_ROOT") {
            self.output_root = PathBuf::from(v);
        }
        if let Some(v) = get("EASYOCR_BIN") {
            self.ocr.program = v.to_string();
        }
        if let Some(flag) = get("BIBTAG_USE_GPU").and_then(parse_flag) {
            self.ocr.use_gpu = flag;
        }
        if let Some(v) = get("OLLAMA_URL") {
            self.ollama.base_url = v.to_string();
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama.model = v.to_string();
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v.to_string());
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.openai.model = v.to_string();
        }
        if let Some(v) = get("OPENAI_BASE_URL") {
            self.openai.base_url = v.to_string();
        }
        if let Some(v) = get("RUST_LOG") {
            self.log_level = v.to_string();
        }
        if let Some(v) = get("BIBTAG_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(v));
        }
    }
}
