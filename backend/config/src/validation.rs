//! Startup validation. Errors here abort the process before any batch runs.

use bibtag_core::BackendKind;
use thiserror::Error;

use crate::schema::Config;

/// A config validation problem with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Everything found wrong with a config in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the settings the selected backends depend on.
pub fn validate(config: &Config, backends: &[BackendKind]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.prompt.trim().is_empty() && backends.iter().any(|b| is_vision_model(*b)) {
        report.error("prompt", "prompt must not be empty");
    }

    let uses = |kinds: &[BackendKind]| backends.iter().any(|b| kinds.contains(b));
    if uses(&[BackendKind::OcrCpu, BackendKind::OcrGpu]) {
        validate_ocr(config, &mut report);
    }
    if uses(&[BackendKind::Ollama]) {
        validate_ollama(config, &mut report);
    }
    if uses(&[BackendKind::OpenAi]) {
        validate_openai(config, &mut report);
    }
    report
}

fn is_vision_model(kind: BackendKind) -> bool {
    matches!(kind, BackendKind::Ollama | BackendKind::OpenAi)
}

fn validate_ocr(config: &Config, report: &mut ValidationReport) {
    if config.ocr.program.trim().is_empty() {
        report.error("ocr.program", "OCR program must not be empty");
    }
    if config.ocr.languages.is_empty() {
        report.error("ocr.languages", "at least one OCR language is required");
    }
}

fn validate_ollama(config: &Config, report: &mut ValidationReport) {
    check_url(&config.ollama.base_url, "ollama.baseUrl", report);
    if config.ollama.model.trim().is_empty() {
        report.error("ollama.model", "model name must not be empty");
    }
    if !(0.0..=2.0).contains(&config.ollama.temperature) {
        report.warn(
            "ollama.temperature",
            format!("unusual temperature {}", config.ollama.temperature),
        );
    }
}

fn validate_openai(config: &Config, report: &mut ValidationReport) {
    check_url(&config.openai.base_url, "openai.baseUrl", report);
    if config.openai.model.trim().is_empty() {
        report.error("openai.model", "model name must not be empty");
    }
    let has_key = config
        .openai
        .api_key
        .as_deref()
        .is_some_and(|k| !k.trim().is_empty());
    if !has_key {
        report.error(
            "openai.apiKey",
            "OpenAI API key is not configured; set the OPENAI_API_KEY environment variable",
        );
    }
}

fn check_url(url: &str, path: &str, report: &mut ValidationReport) {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error(path, format!("'{url}' is not an http(s) URL"));
    }
}
