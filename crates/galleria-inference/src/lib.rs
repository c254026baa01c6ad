//! # galleria-inference
//!
//! Vision-language model access for galleria.
//!
//! This crate provides:
//! - The `VisionBackend` trait
//! - Gemini `generateContent` backend (default, feature `gemini`)
//! - Ollama backend for local models (feature `ollama`)
//! - Prompt builders for caption/category and journal suggestions
//! - A tolerant decoder for the model's JSON answer
//! - Environment-driven backend configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use galleria_inference::{decode_suggestions, suggestion_prompt, MediaType, VisionConfig};
//!
//! # async fn run(image: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let vocabulary = vec!["Beach".to_string(), "Family".to_string()];
//! if let Some(backend) = VisionConfig::from_env()?.build() {
//!     let prompt = suggestion_prompt(MediaType::Image, &vocabulary);
//!     let raw = backend.analyze(image, "image/jpeg", &prompt).await?;
//!     let suggestions = decode_suggestions(&raw, &vocabulary).into_suggestions();
//!     println!("{}", suggestions.description);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod prompts;
pub mod suggestion;
pub mod vision;

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

// Mock vision backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use galleria_core::*;

pub use config::{ConfigError, VisionConfig, VisionProvider};
pub use prompts::{journal_prompt, suggestion_prompt};
pub use suggestion::{decode_suggestions, strip_code_fence, SuggestionDecode};
pub use vision::VisionBackend;

#[cfg(feature = "gemini")]
pub use gemini::GeminiVisionBackend;

#[cfg(feature = "ollama")]
pub use ollama::OllamaVisionBackend;
