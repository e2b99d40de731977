//! Configuration schema, typed for serde YAML deserialization.
//!
//! Every field has a default, so an empty file (or no file) is a valid config.

use std::path::PathBuf;

use bibtag_core::BackendKind;
use serde::{Deserialize, Serialize};

/// Instruction sent to the vision models along with each image.
pub const DEFAULT_PROMPT: &str = "Analyze this image and find every number visible in the foreground. \
Ignore numbers in the background and numbers that are out of focus. \
Reply only with the numbers found, separated by commas.";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Folder scanned (non-recursively) for images.
    pub source_dir: PathBuf,
    /// Parent folder of the per-backend destination folders.
    pub output_root: PathBuf,
    pub destinations: DestinationDirs,
    pub ocr: OcrSettings,
    pub ollama: OllamaSettings,
    pub openai: OpenAiSettings,
    /// Prompt shared by the vision-model backends.
    pub prompt: String,
    pub log_level: String,
    /// When set, logs are also written as NDJSON files here.
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("media/maraton-test"),
            output_root: PathBuf::from("media"),
            destinations: DestinationDirs::default(),
            ocr: OcrSettings::default(),
            ollama: OllamaSettings::default(),
            openai: OpenAiSettings::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Destination folder for a backend's renamed copies.
    pub fn destination_for(&self, kind: BackendKind) -> PathBuf {
        let dir = match kind {
            BackendKind::OcrCpu => &self.destinations.cpu,
            BackendKind::OcrGpu => &self.destinations.gpu,
            BackendKind::Ollama => &self.destinations.ollama,
            BackendKind::OpenAi => &self.destinations.openai,
        };
        self.output_root.join(dir)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Folder names under `outputRoot`, one per backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationDirs {
    pub cpu: String,
    pub gpu: String,
    pub ollama: String,
    pub openai: String,
}

impl Default for DestinationDirs {
    fn default() -> Self {
        Self {
            cpu: "procesadas-cpu".to_string(),
            gpu: "procesadas-gpu".to_string(),
            ollama: "procesadas-ollama".to_string(),
            openai: "procesadas-openai".to_string(),
        }
    }
}

/// EasyOCR command-line settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OcrSettings {
    /// Executable name or path of the EasyOCR CLI.
    pub program: String,
    pub languages: Vec<String>,
    /// GPU flag used by the plain `ocr` backend; `ocr-gpu` always enables it.
    pub use_gpu: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            program: "easyocr".to_string(),
            languages: vec!["en".to_string()],
            use_gpu: false,
        }
    }
}

/// Local Ollama server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OllamaSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2-vision".to_string(),
            temperature: 0.1,
        }
    }
}

/// OpenAI Responses API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpenAiSettings {
    pub base_url: String,
    pub model: String,
    /// Never written back out; normally supplied through `OPENAI_API_KEY`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1".to_string(),
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_live_under_output_root() {
        let config = Config::default();
        assert_eq!(
            config.destination_for(BackendKind::Ollama),
            PathBuf::from("media/procesadas-ollama")
        );
        assert_eq!(
            config.destination_for(BackendKind::OcrGpu),
            PathBuf::from("media/procesadas-gpu")
        );
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config: Config = serde_yaml::from_str("ollama:\n  model: llava\n").unwrap();
        assert_eq!(config.ollama.model, "llava");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.openai.model, "gpt-4.1");
        assert_eq!(config.source_dir, PathBuf::from("media/maraton-test"));
    }

    #[test]
    fn api_key_is_never_serialized() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-secret".into());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("sk-secret"));
    }
}
