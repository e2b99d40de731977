//! Per-image pipeline: detect, normalize, extract, name, copy.
//!
//! Linear with no retries. Every error is caught here and turned into an
//! [`ImageOutcome::Failed`], so one bad image never stops the batch.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, warn};

use bibtag_core::{Detector, RenamePlan, SourceImage};
use bibtag_logging::redact_secrets;
use bibtag_understanding::{extract_numbers, normalize};

use crate::naming::plan_rename;

/// Why an image was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The backend returned no text at all (missing field, empty stream).
    NoDetection,
    /// Text came back, possibly empty, but it holds no digits.
    NoNumbers,
}

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Renamed {
        source_name: String,
        new_name: String,
        /// A file with the same name was already in the destination and got replaced.
        overwrote: bool,
    },
    Skipped {
        source_name: String,
        reason: SkipReason,
    },
    Failed {
        source_name: String,
        reason: String,
    },
}

impl ImageOutcome {
    pub fn source_name(&self) -> &str {
        match self {
            Self::Renamed { source_name, .. }
            | Self::Skipped { source_name, .. }
            | Self::Failed { source_name, .. } => source_name,
        }
    }
}

/// Run one image through `detector` and copy it into `destination_dir` if
/// any numbers were found.
pub async fn process_image<D>(detector: &D, image: &SourceImage, destination_dir: &Path) -> ImageOutcome
where
    D: Detector + ?Sized,
{
    match run(detector, image, destination_dir).await {
        Ok(outcome) => outcome,
        Err(e) => ImageOutcome::Failed {
            source_name: image.file_name().to_string(),
            reason: redact_secrets(&format!("{e:#}")),
        },
    }
}

async fn run<D>(detector: &D, image: &SourceImage, destination_dir: &Path) -> Result<ImageOutcome>
where
    D: Detector + ?Sized,
{
    let source_name = image.file_name().to_string();

    let output = detector.detect(image).await?;
    let detection = normalize(output);
    let Some(text) = detection.text() else {
        debug!(image = %source_name, backend = detector.name(), "no text detected");
        return Ok(ImageOutcome::Skipped {
            source_name,
            reason: SkipReason::NoDetection,
        });
    };

    let numbers = extract_numbers(&text)?;
    if numbers.is_empty() {
        return Ok(ImageOutcome::Skipped {
            source_name,
            reason: SkipReason::NoNumbers,
        });
    }

    let plan = plan_rename(image, &numbers, destination_dir);
    let overwrote = copy_to_destination(&plan).await?;
    Ok(ImageOutcome::Renamed {
        source_name,
        new_name: plan.file_name,
        overwrote,
    })
}

/// Copy the source bytes verbatim, creating the destination folder if needed.
/// Returns whether an existing file was replaced.
async fn copy_to_destination(plan: &RenamePlan) -> Result<bool> {
    fs::create_dir_all(&plan.destination_dir)
        .await
        .with_context(|| format!("failed to create {}", plan.destination_dir.display()))?;

    let target = plan.destination_path();
    let existed = fs::try_exists(&target).await.unwrap_or(false);
    if existed {
        warn!(target = %target.display(), source = %plan.source.display(), "overwriting existing file");
    }

    fs::copy(&plan.source, &target)
        .await
        .with_context(|| format!("failed to copy to {}", target.display()))?;
    Ok(existed)
}
