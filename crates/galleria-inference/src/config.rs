//! Vision backend configuration.
//!
//! Loaded from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `VISION_BACKEND` | `gemini` (`gemini`, `ollama`, `none`) |
//! | `GEMINI_API_KEY` / `GOOGLE_API_KEY` | unset, disables Gemini |
//! | `GEMINI_API_BASE` | `https://generativelanguage.googleapis.com/v1beta` |
//! | `GEMINI_MODEL` | `gemini-2.0-flash` |
//! | `OLLAMA_BASE` / `OLLAMA_URL` | `http://127.0.0.1:11434` |
//! | `OLLAMA_VISION_MODEL` | `qwen3-vl:8b` |
//! | `VISION_TIMEOUT_SECS` | `60` |

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use galleria_core::defaults;

use crate::vision::VisionBackend;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which vision provider to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisionProvider {
    #[default]
    Gemini,
    Ollama,
    /// No AI suggestions; uploads still succeed with empty suggestions.
    Disabled,
}

impl FromStr for VisionProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "none" | "disabled" | "off" => Ok(Self::Disabled),
            _ => Err(ConfigError::InvalidBackend(s.to_string())),
        }
    }
}

impl fmt::Display for VisionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
            Self::Disabled => write!(f, "none"),
        }
    }
}

/// Resolved vision configuration.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub provider: VisionProvider,
    pub gemini_api_base: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub ollama_base: String,
    pub ollama_model: String,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: VisionProvider::default(),
            gemini_api_base: defaults::GEMINI_API_BASE.to_string(),
            gemini_api_key: None,
            gemini_model: defaults::GEMINI_MODEL.to_string(),
            ollama_base: defaults::OLLAMA_URL.to_string(),
            ollama_model: defaults::DEFAULT_OLLAMA_VISION_MODEL.to_string(),
            timeout: Duration::from_secs(defaults::VISION_TIMEOUT_SECS),
        }
    }
}

impl VisionConfig {
    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(provider) = get(defaults::ENV_VISION_BACKEND) {
            config.provider = provider.parse()?;
        }
        config.gemini_api_key = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY"));
        if let Some(base) = get("GEMINI_API_BASE") {
            config.gemini_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(base) = get("OLLAMA_BASE").or_else(|| get("OLLAMA_URL")) {
            config.ollama_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get(defaults::ENV_OLLAMA_VISION_MODEL) {
            config.ollama_model = model;
        }
        match get("VISION_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.timeout = Duration::from_secs(secs),
            Some(_) => warn!(
                subsystem = "inference",
                component = "config",
                "Ignoring invalid VISION_TIMEOUT_SECS, using default"
            ),
            None => {}
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let check_url = |name: &str, url: &str| {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, url
                )));
            }
            Ok(())
        };

        match self.provider {
            VisionProvider::Gemini => {
                check_url("GEMINI_API_BASE", &self.gemini_api_base)?;
                if self.gemini_model.is_empty() {
                    return Err(ConfigError::Validation(
                        "GEMINI_MODEL cannot be empty".to_string(),
                    ));
                }
            }
            VisionProvider::Ollama => {
                check_url("OLLAMA_BASE", &self.ollama_base)?;
                if self.ollama_model.is_empty() {
                    return Err(ConfigError::Validation(
                        "OLLAMA_VISION_MODEL cannot be empty".to_string(),
                    ));
                }
            }
            VisionProvider::Disabled => {}
        }
        Ok(())
    }

    /// Build the configured backend.
    ///
    /// Returns `None` when suggestions are disabled, or when Gemini is selected
    /// without an API key.
    pub fn build(&self) -> Option<Arc<dyn VisionBackend>> {
        let backend: Arc<dyn VisionBackend> = match self.provider {
            VisionProvider::Disabled => {
                info!(subsystem = "inference", "Vision suggestions disabled");
                return None;
            }
            #[cfg(feature = "gemini")]
            VisionProvider::Gemini => {
                let Some(key) = self.gemini_api_key.as_deref() else {
                    warn!(
                        subsystem = "inference",
                        component = "gemini",
                        "GEMINI_API_KEY not set, vision suggestions disabled"
                    );
                    return None;
                };
                Arc::new(
                    crate::gemini::GeminiVisionBackend::new(
                        &self.gemini_api_base,
                        key,
                        &self.gemini_model,
                    )
                    .with_timeout(self.timeout),
                )
            }
            #[cfg(feature = "ollama")]
            VisionProvider::Ollama => Arc::new(
                crate::ollama::OllamaVisionBackend::new(&self.ollama_base, &self.ollama_model)
                    .with_timeout(self.timeout),
            ),
            #[allow(unreachable_patterns)]
            other => {
                warn!(
                    subsystem = "inference",
                    provider = %other,
                    "Vision provider not compiled in, vision suggestions disabled"
                );
                return None;
            }
        };

        info!(
            subsystem = "inference",
            component = backend.provider(),
            model = backend.model_name(),
            timeout_secs = self.timeout.as_secs(),
            "Vision backend configured"
        );
        Some(backend)
    }
}
