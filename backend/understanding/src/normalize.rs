//! Response normalizer: adapts each backend's output shape to plain text.
//!
//! - OCR regions are joined with a single space; two regions never share a number.
//!   They always go on to extraction, even when there are none.
//! - Streamed NDJSON is reassembled from the `"response"` field of every line
//!   that parses, with no separator, since the model may split one number
//!   across two chunks. Blank and malformed lines are skipped. An empty
//!   reassembly means nothing was detected.
//! - A single text blob passes through as is, empty or not. Only a missing
//!   one means nothing was detected.

use bibtag_core::{DetectionResult, DetectorOutput};
use serde_json::Value;
use tracing::debug;

/// Separator placed between OCR regions.
pub const REGION_SEPARATOR: &str = " ";

/// Field carrying the text chunk in each streamed JSON object.
const STREAM_TEXT_FIELD: &str = "response";

/// Convert raw detector output into ordered fragments ready for extraction.
pub fn normalize(output: DetectorOutput) -> DetectionResult {
    match output {
        DetectorOutput::Regions(regions) => DetectionResult::new(regions, REGION_SEPARATOR),
        DetectorOutput::JsonLines(body) => {
            let fragments = stream_fragments(&body);
            if fragments.iter().all(String::is_empty) {
                DetectionResult::nothing()
            } else {
                DetectionResult::new(fragments, "")
            }
        }
        DetectorOutput::Text(Some(text)) => DetectionResult::new(vec![text], ""),
        DetectorOutput::Text(None) => DetectionResult::nothing(),
    }
}

/// Text chunks of a newline-delimited JSON body, in line order.
///
/// Lines that are not JSON, are not objects, or lack a string `"response"`
/// field contribute nothing.
pub fn stream_fragments(body: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    for (idx, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                debug!(line = idx + 1, error = %e, "skipping malformed stream line");
                continue;
            }
        };
        if let Some(chunk) = value.get(STREAM_TEXT_FIELD).and_then(Value::as_str) {
            fragments.push(chunk.to_string());
        }
    }
    fragments
}
