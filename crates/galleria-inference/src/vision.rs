//! Vision backend trait shared by all vision-language model clients.

use async_trait::async_trait;
use base64::Engine;

use galleria_core::{Error, Result};

/// Backend that answers a text instruction about one image or video.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Send the media bytes, their declared MIME type and an instruction to
    /// the model. Returns the model's raw text answer, which may be empty.
    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String>;

    /// Check if the vision backend is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;

    /// Short provider name for logs ("gemini", "ollama", "mock").
    fn provider(&self) -> &str;
}

/// Standard base64 encoding for inline media payloads.
pub(crate) fn encode_media(media: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(media)
}

/// Turn a non-2xx response into an inference error carrying the body.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Inference(format!(
        "{} returned {}: {}",
        provider,
        status,
        truncate(&body, 500)
    )))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
