use anyhow::Result;
use async_trait::async_trait;

use crate::types::{DetectorOutput, SourceImage};

/// A backend that looks at one image and reports the raw text it found.
///
/// Implementations are constructed once per batch from the run configuration
/// and are read-only afterwards. Errors are per image: the caller reports them
/// and moves on to the next file.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Backend name used in logs and reports (e.g., "ocr", "ollama").
    fn name(&self) -> &str;

    /// Run detection on a single image.
    async fn detect(&self, image: &SourceImage) -> Result<DetectorOutput>;
}
