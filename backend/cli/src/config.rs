//! Resolve command-line arguments against the loaded [`Config`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use bibtag_config::{load_config, Config};
use bibtag_core::BackendKind;

/// One batch to run: a backend and where its copies go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub kind: BackendKind,
    pub destination: PathBuf,
}

/// Config file, then environment overrides, then command-line paths.
pub async fn resolve(
    config_path: &Path,
    env: &HashMap<String, String>,
    source: Option<PathBuf>,
) -> Result<Config> {
    let mut config = load_config(config_path).await?;
    config.apply_env(env);
    if let Some(source) = source {
        config.source_dir = source;
    }
    Ok(config)
}

/// Backends for `compare`, baseline first.
pub fn compare_backends(with_gpu: bool, skip_openai: bool) -> Vec<BackendKind> {
    let mut kinds = vec![BackendKind::OcrCpu];
    if with_gpu {
        kinds.push(BackendKind::OcrGpu);
    }
    kinds.push(BackendKind::Ollama);
    if !skip_openai {
        kinds.push(BackendKind::OpenAi);
    }
    kinds
}

pub fn plan(config: &Config, kinds: &[BackendKind], dest_override: Option<&Path>) -> Vec<BatchPlan> {
    kinds
        .iter()
        .map(|&kind| BatchPlan {
            kind,
            destination: dest_override
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.destination_for(kind)),
        })
        .collect()
}
