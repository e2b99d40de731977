use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use bibtag_core::{Detector, SourceImage};

use crate::pipeline::{process_image, ImageOutcome};

/// Image files directly under `source_dir`, in directory-listing order.
///
/// Non-recursive. Only names ending in `.png`, `.jpg` or `.jpeg` (any case)
/// are returned; directories with such names are ignored.
pub async fn list_images(source_dir: &Path) -> Result<Vec<SourceImage>> {
    let mut entries = fs::read_dir(source_dir)
        .await
        .with_context(|| format!("failed to list {}", source_dir.display()))?;

    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if !SourceImage::is_supported_name(name) {
            continue;
        }
        if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        images.push(SourceImage::new(entry.path()));
    }
    Ok(images)
}

/// Outcomes and wall-clock time of one batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub backend: String,
    pub outcomes: Vec<ImageOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Renamed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ImageOutcome::Failed { .. }))
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&ImageOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Runs one detector over every image in a source directory, one at a time.
pub struct BatchRunner<'a, D: Detector + ?Sized> {
    detector: &'a D,
    source_dir: &'a Path,
    destination_dir: PathBuf,
}

impl<'a, D: Detector + ?Sized> BatchRunner<'a, D> {
    pub fn new(detector: &'a D, source_dir: &'a Path, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            detector,
            source_dir,
            destination_dir: destination_dir.into(),
        }
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Process the whole folder. `on_outcome` sees each image as soon as it is done.
    ///
    /// Only a failure to list the source folder is an error; per-image
    /// problems end up in the report.
    pub async fn run<F>(&self, mut on_outcome: F) -> Result<BatchReport>
    where
        F: FnMut(&ImageOutcome),
    {
        let started = Instant::now();
        let images = list_images(self.source_dir).await?;
        info!(
            backend = self.detector.name(),
            images = images.len(),
            source = %self.source_dir.display(),
            destination = %self.destination_dir.display(),
            "Starting batch"
        );

        let mut outcomes = Vec::with_capacity(images.len());
        for image in &images {
            let outcome = process_image(self.detector, image, &self.destination_dir).await;
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        let report = BatchReport {
            backend: self.detector.name().to_string(),
            outcomes,
            elapsed: started.elapsed(),
        };
        info!(
            backend = %report.backend,
            renamed = report.renamed(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Batch finished"
        );
        Ok(report)
    }
}
