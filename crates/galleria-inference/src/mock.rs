//! Mock vision backend for deterministic testing.
//!
//! ```rust,ignore
//! use galleria_inference::mock::MockVisionBackend;
//!
//! let backend = MockVisionBackend::new().with_response(r#"{"description":"x","categories":[]}"#);
//! let text = backend.analyze(b"img", "image/png", "describe").await?;
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use galleria_core::{Error, Result};

use crate::vision::VisionBackend;

/// Mock vision backend that records every call.
#[derive(Clone)]
pub struct MockVisionBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    response: String,
    failure: Option<String>,
    latency: Duration,
    healthy: bool,
}

/// One recorded `analyze` call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub mime_type: String,
    pub instruction: String,
    pub media_len: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            response: String::new(),
            failure: None,
            latency: Duration::ZERO,
            healthy: true,
        }
    }
}

impl Default for MockVisionBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVisionBackend {
    /// Mock that answers every call with an empty string.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every call with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).response = response.into();
        self
    }

    /// Fail every call with an inference error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).failure = Some(message.into());
        self
    }

    /// Sleep before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        Arc::make_mut(&mut self.config).latency = latency;
        self
    }

    pub fn with_health(mut self, healthy: bool) -> Self {
        Arc::make_mut(&mut self.config).healthy = healthy;
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or_default()
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn analyze(&self, media: &[u8], mime_type: &str, instruction: &str) -> Result<String> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push(MockCall {
                mime_type: mime_type.to_string(),
                instruction: instruction.to_string(),
                media_len: media.len(),
            });
        }

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        match &self.config.failure {
            Some(message) => Err(Error::Inference(message.clone())),
            None => Ok(self.config.response.clone()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.config.healthy)
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }

    fn provider(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let backend = MockVisionBackend::new().with_response("hello");
        let text = backend.analyze(b"abc", "image/png", "describe").await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(backend.call_count(), 1);
        let call = &backend.calls()[0];
        assert_eq!(call.mime_type, "image/png");
        assert_eq!(call.instruction, "describe");
        assert_eq!(call.media_len, 3);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let backend = MockVisionBackend::new().with_failure("boom");
        let err = backend.analyze(b"", "image/png", "x").await.unwrap_err();
        assert!(matches!(err, Error::Inference(m) if m == "boom"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let backend = MockVisionBackend::new();
        let clone = backend.clone();
        clone.analyze(b"x", "video/mp4", "y").await.unwrap();
        assert_eq!(backend.call_count(), 1);
    }
}
