//! # galleria-core
//!
//! Core types, traits, and abstractions for the galleria media service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other galleria crates depend on, plus the perceptual hash used for
//! near-duplicate detection.

pub mod defaults;
pub mod error;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod phash;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use file_safety::{
    is_inline_safe, is_valid_mime_type, resolve_mime_type, sanitize_filename, validate_media,
};
pub use models::*;
pub use phash::{hamming_distance, DctHasher};
pub use traits::*;
