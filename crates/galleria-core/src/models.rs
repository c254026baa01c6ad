//! Core data models for galleria.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// MEDIA
// =============================================================================

/// Kind of media stored in a gallery. Fixed when the item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// MIME family prefix for this media type (`image/` or `video/`).
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaType::Image => "image/",
            MediaType::Video => "video/",
        }
    }

    /// Maximum stored size for this media type.
    pub fn max_bytes(&self) -> usize {
        match self {
            MediaType::Image => crate::defaults::MAX_IMAGE_BYTES,
            MediaType::Video => crate::defaults::MAX_VIDEO_BYTES,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(Error::InvalidInput(format!(
                "Unknown media type '{}', expected 'image' or 'video'",
                other
            ))),
        }
    }
}

/// A photo or video in a user's gallery.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: Uuid,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Perceptual fingerprint; `None` for videos and for images that failed to hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phash: Option<String>,
    pub description: String,
    /// Category names, in assignment order.
    pub categories: Vec<String>,
    pub journal: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub size_bytes: i64,
    /// `blake3:<hex>` of the stored bytes.
    pub content_hash: String,
    #[serde(skip)]
    pub storage_path: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

// =============================================================================
// CATEGORIES
// =============================================================================

/// A category in a user's vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Names of a vocabulary, in the order given.
pub fn vocabulary_names(categories: &[Category]) -> Vec<String> {
    categories.iter().map(|c| c.name.clone()).collect()
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Caption and categories suggested for an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestions {
    pub categories: Vec<String>,
    pub description: String,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.categories.is_empty()
    }
}

/// Style of an AI-written journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JournalStyle {
    /// Frames the moment as a memorable occasion.
    SpecialDay,
    /// Describes the feeling of the scene.
    Mood,
    /// A short poetic reflection.
    Poetic,
}

impl JournalStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalStyle::SpecialDay => "special-day",
            JournalStyle::Mood => "mood",
            JournalStyle::Poetic => "poetic",
        }
    }
}

impl fmt::Display for JournalStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append generated text to an existing journal, separated by a blank line.
pub fn append_journal(existing: &str, addition: &str) -> String {
    if existing.is_empty() {
        addition.to_string()
    } else {
        format!("{}\n\n{}", existing, addition)
    }
}
