use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use bibtag_config::OllamaSettings;
use bibtag_core::{BackendKind, Detector, DetectorOutput, SourceImage};

/// Local vision model served by Ollama.
///
/// Uses `/api/generate` with streaming left on, so the body comes back as
/// one JSON object per line; reassembly happens in the normalizer.
pub struct OllamaDetector {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    prompt: String,
}

impl OllamaDetector {
    pub fn new(settings: &OllamaSettings, prompt: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            prompt: prompt.into(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[async_trait]
impl Detector for OllamaDetector {
    fn name(&self) -> &str {
        BackendKind::Ollama.as_str()
    }

    async fn detect(&self, image: &SourceImage) -> Result<DetectorOutput> {
        let bytes = image
            .read_bytes()
            .await
            .with_context(|| format!("failed to read {}", image.path().display()))?;

        let body = GenerateRequest {
            model: &self.model,
            prompt: &self.prompt,
            images: vec![STANDARD.encode(&bytes)],
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, image = %image.file_name(), "Sending request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Ollama HTTP request failed")?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Ollama returned {}: {}", status, error_body.trim());
        }

        let text = response
            .text()
            .await
            .context("Failed to read Ollama response body")?;
        Ok(DetectorOutput::JsonLines(text))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode as HttpStatus, routing::post, Json, Router};
    use serde_json::Value;

    use super::*;

    type Captured = Arc<Mutex<Option<Value>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn image_in(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> SourceImage {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        SourceImage::new(path)
    }

    #[tokio::test]
    async fn posts_image_and_returns_stream_body() {
        let captured: Captured = Arc::default();
        let router = Router::new()
            .route(
                "/api/generate",
                post(|State(seen): State<Captured>, Json(body): Json<Value>| async move {
                    *seen.lock().unwrap() = Some(body);
                    "{\"response\":\"4\"}\n{\"response\":\"2, 7\"}\n{\"response\":\"\",\"done\":true}\n"
                }),
            )
            .with_state(captured.clone());
        let base_url = serve(router).await;

        let dir = tempfile::tempdir().unwrap();
        let image = image_in(&dir, "bib001.jpg", b"\xff\xd8\xff");
        let settings = OllamaSettings {
            base_url: format!("{base_url}/"),
            model: "llava".into(),
            temperature: 0.1,
        };
        let detector = OllamaDetector::new(&settings, "find numbers");

        let output = detector.detect(&image).await.unwrap();
        let DetectorOutput::JsonLines(body) = output else {
            panic!("expected json lines");
        };
        assert!(body.contains("\"2, 7\""));

        let request = captured.lock().unwrap().take().unwrap();
        assert_eq!(request["model"], "llava");
        assert_eq!(request["prompt"], "find numbers");
        assert_eq!(request["images"][0], STANDARD.encode(b"\xff\xd8\xff"));
        assert!((request["options"]["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn non_200_status_is_a_failure() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (HttpStatus::NOT_FOUND, "model 'llava' not found") }),
        );
        let base_url = serve(router).await;

        let dir = tempfile::tempdir().unwrap();
        let image = image_in(&dir, "a.png", b"png");
        let settings = OllamaSettings {
            base_url,
            ..OllamaSettings::default()
        };
        let err = OllamaDetector::new(&settings, "p").detect(&image).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("model 'llava' not found"));
    }

    #[tokio::test]
    async fn unreadable_image_fails_before_request() {
        let settings = OllamaSettings {
            base_url: "http://127.0.0.1:9".into(),
            ..OllamaSettings::default()
        };
        let image = SourceImage::new("/definitely/not/here.jpg");
        let err = OllamaDetector::new(&settings, "p").detect(&image).await.unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
