//! Centralized default constants for galleria.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic numbers.

// =============================================================================
// VOCABULARY
// =============================================================================

/// Category names offered to a new user.
pub const DEFAULT_CATEGORIES: [&str; 10] = [
    "Beach", "Family", "Friends", "Travel", "Food", "Nature", "Party", "Pets", "Sports", "Other",
];

/// Maximum length of a category name, in characters.
pub const CATEGORY_NAME_MAX_LENGTH: usize = 50;

// =============================================================================
// UPLOAD LIMITS
// =============================================================================

/// Maximum image size accepted for a stored media item (2 MiB).
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Maximum video size accepted for a stored media item (15 MiB, ~30 seconds).
pub const MAX_VIDEO_BYTES: usize = 15 * 1024 * 1024;

/// Maximum request body size in bytes (16 MiB, one video plus form overhead).
pub const MAX_BODY_SIZE_BYTES: usize = 16 * 1024 * 1024;

// =============================================================================
// PERCEPTUAL HASH
// =============================================================================

/// Side length of the greyscale sample the DCT runs over.
pub const PHASH_SAMPLE_SIZE: u32 = 32;

/// Side length of the low-frequency DCT block kept for the fingerprint.
pub const PHASH_LOW_SIZE: usize = 8;

/// Length of a fingerprint string (one character per bit).
pub const PHASH_BITS: usize = PHASH_LOW_SIZE * PHASH_LOW_SIZE;

/// Time budget for fingerprinting one image, in milliseconds.
pub const HASH_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for media listings.
pub const PAGE_LIMIT: i64 = 50;

/// Upper bound on a caller-supplied page size.
pub const PAGE_LIMIT_MAX: i64 = 200;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;

/// Default blob storage root.
pub const FILE_STORAGE_PATH: &str = "/var/lib/galleria/media";

// =============================================================================
// VISION
// =============================================================================

/// Environment variable selecting the vision backend (`gemini`, `ollama`, `none`).
pub const ENV_VISION_BACKEND: &str = "VISION_BACKEND";

/// Default Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default Ollama base URL.
pub const OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Environment variable for the Ollama vision model.
pub const ENV_OLLAMA_VISION_MODEL: &str = "OLLAMA_VISION_MODEL";

/// Default Ollama vision model.
pub const DEFAULT_OLLAMA_VISION_MODEL: &str = "qwen3-vl:8b";

/// Time budget for one remote vision call, in seconds.
pub const VISION_TIMEOUT_SECS: u64 = 60;

/// Timeout for backend health probes, in seconds.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories_are_unique() {
        let mut names = DEFAULT_CATEGORIES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_CATEGORIES.len());
    }

    #[test]
    fn test_default_categories_fit_name_limit() {
        assert!(DEFAULT_CATEGORIES
            .iter()
            .all(|c| !c.is_empty() && c.chars().count() <= CATEGORY_NAME_MAX_LENGTH));
    }

    #[test]
    fn test_body_limit_covers_largest_upload() {
        assert!(MAX_BODY_SIZE_BYTES > MAX_VIDEO_BYTES);
        assert!(MAX_VIDEO_BYTES > MAX_IMAGE_BYTES);
    }

    #[test]
    fn test_phash_bits() {
        assert_eq!(PHASH_BITS, 64);
    }
}
