use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use bibtag_core::{BibError, Detector, DetectorOutput, SourceImage};

/// A detector that returns canned outputs keyed by file name.
///
/// Every call is recorded, so tests can check what was asked and in which order.
pub struct MockDetector {
    name: String,
    replies: HashMap<String, Result<DetectorOutput, String>>,
    fallback: DetectorOutput,
    calls: Mutex<Vec<String>>,
}

impl MockDetector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: HashMap::new(),
            fallback: DetectorOutput::Text(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `output` for the image called `file_name`.
    pub fn with_output(mut self, file_name: impl Into<String>, output: DetectorOutput) -> Self {
        self.replies.insert(file_name.into(), Ok(output));
        self
    }

    /// Shorthand for a single-text reply.
    pub fn with_text(self, file_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_output(file_name, DetectorOutput::Text(Some(text.into())))
    }

    /// Fail detection for the image called `file_name`.
    pub fn with_failure(mut self, file_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.replies.insert(file_name.into(), Err(message.into()));
        self
    }

    /// File names seen so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Detector for MockDetector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn detect(&self, image: &SourceImage) -> Result<DetectorOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(image.file_name().to_string());
        }
        match self.replies.get(image.file_name()) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(message)) => Err(BibError::detector(&self.name, message.as_str()).into()),
            None => Ok(self.fallback.clone()),
        }
    }
}
