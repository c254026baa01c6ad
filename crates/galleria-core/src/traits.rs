//! Core traits for galleria abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CATEGORY REPOSITORY
// =============================================================================

/// Repository for a user's category vocabulary.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List the owner's categories, ordered by name.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Category>>;

    /// Create a category. Fails with `Conflict` if the owner already has the name.
    async fn create(&self, owner_id: &str, name: &str) -> Result<Category>;

    /// Delete one of the owner's categories.
    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()>;

    /// Insert any of `names` the owner does not have yet. Returns the full vocabulary.
    async fn ensure_names(&self, owner_id: &str, names: &[&str]) -> Result<Vec<Category>>;
}

// =============================================================================
// MEDIA REPOSITORY
// =============================================================================

/// Request for inserting a media item.
#[derive(Debug, Clone)]
pub struct CreateMediaRequest {
    pub id: Uuid,
    pub owner_id: String,
    pub media_type: MediaType,
    pub phash: Option<String>,
    pub description: String,
    pub categories: Vec<String>,
    pub journal: String,
    pub mime_type: String,
    pub file_name: Option<String>,
    pub size_bytes: i64,
    pub content_hash: String,
    pub storage_path: String,
}

/// Partial update of a media item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMediaRequest {
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub journal: Option<String>,
}

impl UpdateMediaRequest {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.categories.is_none() && self.journal.is_none()
    }
}

/// Request for listing an owner's media.
#[derive(Debug, Clone, Default)]
pub struct ListMediaRequest {
    pub owner_id: String,
    pub media_type: Option<MediaType>,
    /// Only items carrying this category name
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for media items.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Insert a new item.
    async fn insert(&self, req: CreateMediaRequest) -> Result<MediaItem>;

    /// Fetch one of the owner's items. Items of other owners are reported as missing.
    async fn fetch(&self, owner_id: &str, id: Uuid) -> Result<MediaItem>;

    /// List the owner's items, newest first.
    async fn list(&self, req: ListMediaRequest) -> Result<Vec<MediaItem>>;

    /// Find an existing item of the same owner and type with exactly this fingerprint.
    async fn find_duplicate(
        &self,
        owner_id: &str,
        media_type: MediaType,
        phash: &str,
    ) -> Result<Option<MediaItem>>;

    /// Apply a partial update and return the updated item.
    async fn update(&self, owner_id: &str, id: Uuid, req: UpdateMediaRequest)
        -> Result<MediaItem>;
}

// =============================================================================
// PERCEPTUAL HASHING
// =============================================================================

/// Computes a perceptual fingerprint for encoded image bytes.
///
/// CPU bound; async callers should run it on a blocking thread.
pub trait PerceptualHasher: Send + Sync {
    fn hash(&self, image_data: &[u8]) -> Result<String>;
}
