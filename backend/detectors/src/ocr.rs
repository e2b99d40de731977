//! Local OCR through the EasyOCR command-line tool.
//!
//! Runs `easyocr -l <langs> -f <image> --detail 0 --gpu <flag>` and reads one
//! recognized region per stdout line.
//!
//! The CLI parses `--gpu` with Python's `bool()`, so any non-empty string
//! (including `False`) turns the GPU on. CPU runs pass an empty value and
//! also hide CUDA devices from the child.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use bibtag_config::OcrSettings;
use bibtag_core::{BackendKind, Detector, DetectorOutput, SourceImage};

/// Bytes of stderr kept in an error message.
const STDERR_TAIL: usize = 400;

pub struct OcrDetector {
    program: String,
    languages: Vec<String>,
    use_gpu: bool,
}

impl OcrDetector {
    pub fn new(settings: &OcrSettings, use_gpu: bool) -> Self {
        Self {
            program: settings.program.clone(),
            languages: settings.languages.clone(),
            use_gpu,
        }
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-l")
            .args(&self.languages)
            .arg("-f")
            .arg(image)
            .args(["--detail", "0"])
            .arg("--gpu")
            .arg(gpu_flag(self.use_gpu));
        if !self.use_gpu {
            cmd.env("CUDA_VISIBLE_DEVICES", "");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Value for `--gpu`: only the empty string reads as false.
fn gpu_flag(use_gpu: bool) -> &'static str {
    if use_gpu {
        "True"
    } else {
        ""
    }
}

/// Recognized regions in the tool's output, one per non-blank line.
pub fn parse_regions(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn tail(text: &str, max: usize) -> &str {
    let text = text.trim();
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[async_trait]
impl Detector for OcrDetector {
    fn name(&self) -> &str {
        if self.use_gpu {
            BackendKind::OcrGpu.as_str()
        } else {
            BackendKind::OcrCpu.as_str()
        }
    }

    async fn detect(&self, image: &SourceImage) -> Result<DetectorOutput> {
        debug!(image = %image.file_name(), gpu = self.use_gpu, "Running EasyOCR");
        let output = self
            .command(image.path())
            .output()
            .await
            .with_context(|| format!("failed to launch OCR program '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "OCR program exited with {}: {}",
                output.status,
                tail(&stderr, STDERR_TAIL)
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(DetectorOutput::Regions(parse_regions(&stdout)))
    }
}
