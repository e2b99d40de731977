use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use bibtag_config::Config;
use bibtag_core::{BackendKind, BibError, Detector};

use crate::{OcrDetector, OllamaDetector, OpenAiDetector};

/// Registry of detectors, looked up by backend.
pub struct DetectorRegistry {
    detectors: HashMap<BackendKind, Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: HashMap::new(),
        }
    }

    /// Build a detector for each requested backend from the run configuration.
    ///
    /// Fails if a backend's credentials are missing; nothing is contacted yet.
    pub fn from_config(config: &Config, kinds: &[BackendKind]) -> Result<Self> {
        let mut registry = Self::new();
        for &kind in kinds {
            let detector: Arc<dyn Detector> = match kind {
                BackendKind::OcrCpu => Arc::new(OcrDetector::new(&config.ocr, config.ocr.use_gpu)),
                BackendKind::OcrGpu => Arc::new(OcrDetector::new(&config.ocr, true)),
                BackendKind::Ollama => Arc::new(OllamaDetector::new(&config.ollama, &config.prompt)),
                BackendKind::OpenAi => {
                    let Some(api_key) = config.openai.api_key.as_deref().filter(|k| !k.is_empty()) else {
                        return Err(BibError::Config(
                            "OpenAI API key is not configured (OPENAI_API_KEY)".into(),
                        )
                        .into());
                    };
                    Arc::new(OpenAiDetector::new(&config.openai, api_key, &config.prompt))
                }
            };
            registry.register(kind, detector);
        }
        Ok(registry)
    }

    pub fn register(&mut self, kind: BackendKind, detector: Arc<dyn Detector>) {
        self.detectors.insert(kind, detector);
    }

    pub fn get(&self, kind: BackendKind) -> Option<Arc<dyn Detector>> {
        self.detectors.get(&kind).cloned()
    }

    /// Registered backends, in the canonical order.
    pub fn kinds(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|k| self.detectors.contains_key(k))
            .collect()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockDetector;

    #[test]
    fn builds_requested_backends() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-test".into());
        let registry = DetectorRegistry::from_config(&config, &BackendKind::ALL).unwrap();

        assert_eq!(registry.kinds(), BackendKind::ALL.to_vec());
        for kind in BackendKind::ALL {
            assert_eq!(registry.get(kind).unwrap().name(), kind.as_str());
        }
    }

    #[test]
    fn openai_without_key_is_rejected() {
        let config = Config::default();
        let err = DetectorRegistry::from_config(&config, &[BackendKind::OpenAi])
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
        assert!(DetectorRegistry::from_config(&config, &[BackendKind::Ollama]).is_ok());
    }

    #[test]
    fn register_overrides_and_get_misses() {
        let mut registry = DetectorRegistry::new();
        registry.register(BackendKind::Ollama, Arc::new(MockDetector::new("fake")));
        assert_eq!(registry.get(BackendKind::Ollama).unwrap().name(), "fake");
        assert!(registry.get(BackendKind::OpenAi).is_none());
    }
}
