//! Local Ollama vision backend (qwen3-vl, llava and friends).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use galleria_core::defaults::{HEALTH_CHECK_TIMEOUT_SECS, VISION_TIMEOUT_SECS};
use galleria_core::{Error, Result};

use crate::vision::{check_status, encode_media, VisionBackend};

/// `/api/generate` with the media attached as a base64 image.
///
/// Ollama takes still images only, so video is refused before any request.
pub struct OllamaVisionBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaVisionBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(VISION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    images: [String; 1],
    stream: bool,
    /// Reasoning models otherwise spend the budget on hidden thoughts.
    think: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsReply {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// `qwen3-vl` matches the pulled `qwen3-vl:latest`.
fn same_model(wanted: &str, listed: &str) -> bool {
    listed == wanted || (!wanted.contains(':') && listed.strip_suffix(":latest") == Some(wanted))
}

#[async_trait]
impl VisionBackend for OllamaVisionBackend {
    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String> {
        if mime_type.starts_with("video/") {
            return Err(Error::InvalidInput(format!(
                "Ollama cannot read {} media",
                mime_type
            )));
        }

        let body = GenerateBody {
            model: &self.model,
            prompt: instruction,
            images: [encode_media(media)],
            stream: false,
            think: false,
        };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;
        let reply: GenerateReply = check_status("Ollama", response)
            .await?
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Unreadable Ollama reply: {}", e)))?;

        debug!(
            subsystem = "inference",
            component = "ollama",
            op = "analyze",
            model = %self.model,
            response_len = reply.response.len(),
            "Ollama answered"
        );
        Ok(reply.response)
    }

    /// Reachable and the configured model has been pulled.
    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await;
        let Ok(response) = response else {
            return Ok(false);
        };
        if !response.status().is_success() {
            return Ok(false);
        }
        let tags: TagsReply = response.json().await.unwrap_or(TagsReply { models: Vec::new() });
        Ok(tags.models.iter().any(|m| same_model(&self.model, &m.name)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "ollama"
    }
}
