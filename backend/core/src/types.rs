use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// File extensions picked up from the source directory (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Which detection backend a batch runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Local OCR engine on the CPU.
    OcrCpu,
    /// Local OCR engine with GPU acceleration.
    OcrGpu,
    /// Local vision model served by Ollama (streamed NDJSON).
    Ollama,
    /// OpenAI Responses API.
    OpenAi,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [Self::OcrCpu, Self::OcrGpu, Self::Ollama, Self::OpenAi];

    /// Registry key, also accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OcrCpu => "ocr",
            Self::OcrGpu => "ocr-gpu",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }

    /// Short label used in the timing summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OcrCpu => "CPU",
            Self::OcrGpu => "GPU",
            Self::Ollama => "Ollama",
            Self::OpenAi => "OpenAI",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, Self::OpenAi)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ocr" | "ocr-cpu" | "cpu" => Ok(Self::OcrCpu),
            "ocr-gpu" | "gpu" => Ok(Self::OcrGpu),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!(
                "unknown backend '{other}' (expected one of: ocr, ocr-gpu, ollama, openai)"
            )),
        }
    }
}

/// An image file found in the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    path: PathBuf,
    file_name: String,
    extension: String,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&file_name).to_string();
        Self {
            path,
            file_name,
            extension,
        }
    }

    /// True when the name ends with one of [`IMAGE_EXTENSIONS`], ignoring case.
    pub fn is_supported_name(file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Extension including the leading dot, case preserved. Empty when there is none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn mime_type(&self) -> &'static str {
        if self.extension.eq_ignore_ascii_case(".png") {
            "image/png"
        } else {
            "image/jpeg"
        }
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// Extension of a file name with its leading dot (`"a.b.JPG"` -> `".JPG"`).
///
/// Leading dots belong to the stem, so `".jpg"` has no extension.
pub fn extension_of(file_name: &str) -> &str {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(idx) => &file_name[stem_start + idx..],
        None => "",
    }
}

/// Raw output of a detector, in the shape its backend produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorOutput {
    /// One string per recognized text region, in reading order.
    Regions(Vec<String>),
    /// Response body holding one JSON object per line.
    JsonLines(String),
    /// A single aggregated text, or `None` when the backend returned none.
    Text(Option<String>),
}

/// Ordered text fragments for one image, plus how they are joined.
///
/// A result built with [`DetectionResult::nothing`] means the backend gave
/// no text at all, which is different from text that holds no numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    fragments: Vec<String>,
    separator: &'static str,
    detected: bool,
}

impl DetectionResult {
    pub fn new(fragments: Vec<String>, separator: &'static str) -> Self {
        Self {
            fragments,
            separator,
            detected: true,
        }
    }

    pub fn nothing() -> Self {
        Self {
            fragments: Vec::new(),
            separator: "",
            detected: false,
        }
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn separator(&self) -> &'static str {
        self.separator
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    /// Joined text, or `None` when nothing was detected. Detected text may be empty.
    pub fn text(&self) -> Option<String> {
        self.detected.then(|| self.fragments.join(self.separator))
    }
}

/// Distinct non-negative integers found on an image, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberSet(BTreeSet<u64>);

impl NumberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: u64) -> bool {
        self.0.insert(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }
}

impl FromIterator<u64> for NumberSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Where one source image will be copied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub file_name: String,
    pub destination_dir: PathBuf,
}

impl RenamePlan {
    pub fn destination_path(&self) -> PathBuf {
        self.destination_dir.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_round_trips_through_str() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
        assert_eq!("CPU".parse::<BackendKind>().unwrap(), BackendKind::OcrCpu);
        assert!("tesseract".parse::<BackendKind>().is_err());
    }

    #[test]
    fn backend_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&BackendKind::OcrGpu).unwrap();
        assert_eq!(json, "\"ocr-gpu\"");
    }

    #[test]
    fn extension_keeps_case_and_last_dot() {
        assert_eq!(extension_of("bib001.jpg"), ".jpg");
        assert_eq!(extension_of("IMG.final.JPEG"), ".JPEG");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of(".jpg"), "");
        assert_eq!(extension_of("..hidden.png"), ".png");
    }

    #[test]
    fn supported_names_match_case_insensitively() {
        assert!(SourceImage::is_supported_name("a.JPG"));
        assert!(SourceImage::is_supported_name("a.jpeg"));
        assert!(SourceImage::is_supported_name("a.Png"));
        assert!(!SourceImage::is_supported_name("a.gif"));
        assert!(!SourceImage::is_supported_name("jpg"));
    }

    #[test]
    fn source_image_derives_name_and_mime() {
        let img = SourceImage::new("/photos/race/Finish.PNG");
        assert_eq!(img.file_name(), "Finish.PNG");
        assert_eq!(img.extension(), ".PNG");
        assert_eq!(img.mime_type(), "image/png");
        assert_eq!(SourceImage::new("x.jpeg").mime_type(), "image/jpeg");
    }

    #[test]
    fn detection_text_distinguishes_nothing_from_empty() {
        assert_eq!(DetectionResult::nothing().text(), None);
        assert!(!DetectionResult::nothing().is_detected());
        assert_eq!(DetectionResult::new(vec![], " ").text().as_deref(), Some(""));
        assert_eq!(DetectionResult::new(vec![String::new()], "").text().as_deref(), Some(""));
        let joined = DetectionResult::new(vec!["20".into(), "24".into()], " ");
        assert_eq!(joined.text().as_deref(), Some("20 24"));
    }

    #[test]
    fn number_set_is_sorted_and_deduplicated() {
        let set: NumberSet = [200, 5, 12, 5].into_iter().collect();
        assert_eq!(set.to_vec(), vec![5, 12, 200]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn rename_plan_joins_destination() {
        let plan = RenamePlan {
            source: PathBuf::from("in/a.jpg"),
            file_name: "n7_n42.jpg".into(),
            destination_dir: PathBuf::from("out"),
        };
        assert_eq!(plan.destination_path(), PathBuf::from("out/n7_n42.jpg"));
    }
}
