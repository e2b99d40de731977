//! Cloud vision backend on the OpenAI Responses API.
//!
//! Sends the prompt plus the image as a base64 data URI and reads back the
//! aggregated output text.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use bibtag_config::OpenAiSettings;
use bibtag_core::{BackendKind, Detector, DetectorOutput, SourceImage};

pub struct OpenAiDetector {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    prompt: String,
}

impl OpenAiDetector {
    pub fn new(settings: &OpenAiSettings, api_key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.into(),
            prompt: prompt.into(),
        }
    }

    fn request_body(&self, image: &SourceImage, bytes: &[u8]) -> Value {
        let data_uri = format!("data:{};base64,{}", image.mime_type(), STANDARD.encode(bytes));
        serde_json::json!({
            "model": self.model,
            "input": [{
                "role": "user",
                "content": [
                    { "type": "input_text", "text": self.prompt },
                    { "type": "input_image", "image_url": data_uri }
                ]
            }]
        })
    }
}

/// The response's aggregated output text.
///
/// Uses the top-level `output_text` when the server provides it, otherwise
/// concatenates every `output_text` part of the `message` items in `output`.
/// An empty string is still text; `None` only when no text field exists.
pub fn output_text(response: &Value) -> Option<String> {
    if let Some(text) = response["output_text"].as_str() {
        return Some(text.to_string());
    }

    let parts: Vec<&str> = response["output"]
        .as_array()
        .into_iter()
        .flatten()
        .filter(|item| item["type"] == "message")
        .filter_map(|item| item["content"].as_array())
        .flatten()
        .filter(|part| part["type"] == "output_text")
        .filter_map(|part| part["text"].as_str())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

#[async_trait]
impl Detector for OpenAiDetector {
    fn name(&self) -> &str {
        BackendKind::OpenAi.as_str()
    }

    async fn detect(&self, image: &SourceImage) -> Result<DetectorOutput> {
        let bytes = image
            .read_bytes()
            .await
            .with_context(|| format!("failed to read {}", image.path().display()))?;
        let body = self.request_body(image, &bytes);

        debug!(model = %self.model, image = %image.file_name(), "Sending request to OpenAI");

        let resp = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI HTTP request failed")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("OpenAI returned {}: {}", status, resp.text().await.unwrap_or_default().trim());
        }

        let json: Value = resp.json().await.context("Failed to parse OpenAI response")?;
        Ok(DetectorOutput::Text(output_text(&json)))
    }
}
