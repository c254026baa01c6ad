//! Structured field names carried by the upload and media log lines.
//!
//! `tracing` macros need literal field names, so call sites spell the field
//! out (`owner_id = %owner`). The API crate's log tests check emitted lines
//! against these names.
//!
//! Levels:
//!
//! | Level | Used for |
//! |-------|----------|
//! | ERROR | A request failed with a 500 |
//! | WARN  | An upload step degraded (hash, duplicate lookup, AI call) |
//! | INFO  | Startup, items and categories created, upload outcomes |
//! | DEBUG | Step timings, backend replies, pool occupancy |

/// "api", "db", "inference" or "hash".
pub const SUBSYSTEM: &str = "subsystem";

/// Part of a subsystem: "upload", "pool", or the vision provider name.
pub const COMPONENT: &str = "component";

/// Pipeline step: "vocabulary", "fingerprint", "duplicate_check", "analyze".
pub const OPERATION: &str = "op";

pub const OWNER_ID: &str = "owner_id";

/// Set on duplicate hits to the id of the existing item.
pub const MEDIA_ID: &str = "media_id";

pub const MEDIA_TYPE: &str = "media_type";

/// `'0'/'1'` fingerprint string.
pub const PHASH: &str = "phash";

pub const DURATION_MS: &str = "duration_ms";

/// Upload payload length.
pub const SIZE_BYTES: &str = "size_bytes";

pub const VOCABULARY_SIZE: &str = "vocabulary_size";

/// Vision model name.
pub const MODEL: &str = "model";

pub const IS_DUPLICATE: &str = "is_duplicate";

/// Display form of the error on WARN and ERROR lines.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_unique_snake_case() {
        let all = [
            SUBSYSTEM,
            COMPONENT,
            OPERATION,
            OWNER_ID,
            MEDIA_ID,
            MEDIA_TYPE,
            PHASH,
            DURATION_MS,
            SIZE_BYTES,
            VOCABULARY_SIZE,
            MODEL,
            IS_DUPLICATE,
            ERROR_MSG,
        ];
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        for name in all {
            assert!(name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }
}
