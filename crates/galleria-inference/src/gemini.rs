//! Gemini `generateContent` vision backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use galleria_core::defaults::{HEALTH_CHECK_TIMEOUT_SECS, VISION_TIMEOUT_SECS};
use galleria_core::{Error, Result};

use crate::vision::{check_status, encode_media, VisionBackend};

/// The key travels in this header so it never appears in a URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Vision backend calling Google's Generative Language API.
pub struct GeminiVisionBackend {
    api_base: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl GeminiVisionBackend {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(VISION_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn model_path(&self) -> String {
        let trimmed = self.model.trim();
        if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{}", trimmed)
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base, self.model_path())
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated. Empty when the model
    /// returned no candidates (e.g. blocked by safety filters).
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionBackend for GeminiVisionBackend {
    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type,
                            data: encode_media(media),
                        },
                    },
                    Part::Text { text: instruction },
                ],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;
        let response = check_status("Gemini", response).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse Gemini response: {}", e)))?;
        let text = body.text();

        debug!(
            subsystem = "inference",
            component = "gemini",
            op = "analyze",
            model = %self.model,
            response_len = text.len(),
            "Gemini response received"
        );
        Ok(text)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/{}", self.api_base, self.model_path());
        match self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}
