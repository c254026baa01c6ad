//! Media library operations: store, browse, edit, serve and journal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use galleria_core::{
    append_journal, resolve_mime_type, sanitize_filename, validate_media, vocabulary_names,
    CategoryRepository, CreateMediaRequest, Error, JournalStyle, ListMediaRequest, MediaItem,
    MediaRepository, MediaType, PerceptualHasher, Result, UpdateMediaRequest,
};
use galleria_db::{compute_content_hash, generate_storage_path, StorageBackend};
use galleria_inference::{journal_prompt, VisionBackend};

use super::hashing::fingerprint_or_none;

/// A file the user chose to keep, with the metadata they confirmed.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub owner_id: String,
    pub media_type: MediaType,
    pub data: Bytes,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub description: String,
    pub categories: Vec<String>,
    pub journal: String,
}

/// Result of a journal suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSuggestion {
    pub suggestion: String,
    /// Updated journal, present when the suggestion was appended.
    pub journal: Option<String>,
}

#[derive(Clone)]
pub struct MediaService {
    categories: Arc<dyn CategoryRepository>,
    media: Arc<dyn MediaRepository>,
    storage: Arc<dyn StorageBackend>,
    hasher: Arc<dyn PerceptualHasher>,
    hash_timeout: Duration,
    vision_timeout: Duration,
}

impl MediaService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        media: Arc<dyn MediaRepository>,
        storage: Arc<dyn StorageBackend>,
        hasher: Arc<dyn PerceptualHasher>,
        hash_timeout: Duration,
        vision_timeout: Duration,
    ) -> Self {
        Self {
            categories,
            media,
            storage,
            hasher,
            hash_timeout,
            vision_timeout,
        }
    }

    /// Store the bytes and insert the item.
    ///
    /// Images are fingerprinted with the same hasher the upload pipeline uses,
    /// so later uploads of the same picture are recognised as duplicates.
    pub async fn create(&self, new: NewMedia) -> Result<MediaItem> {
        let start = Instant::now();
        if new.owner_id.trim().is_empty() || new.data.is_empty() {
            return Err(Error::InvalidInput("Missing required fields".to_string()));
        }

        let mime_type = resolve_mime_type(new.mime_type.as_deref(), &new.data);
        validate_media(new.media_type, &mime_type, new.data.len())?;
        self.check_vocabulary(&new.owner_id, &new.categories).await?;

        let phash = if new.media_type == MediaType::Image {
            fingerprint_or_none(
                self.hasher.clone(),
                new.data.clone(),
                self.hash_timeout,
                &new.owner_id,
            )
            .await
        } else {
            None
        };

        let id = Uuid::now_v7();
        let storage_path = generate_storage_path(&id);
        self.storage.write(&storage_path, &new.data).await?;

        let request = CreateMediaRequest {
            id,
            owner_id: new.owner_id.clone(),
            media_type: new.media_type,
            phash,
            description: new.description,
            categories: new.categories,
            journal: new.journal,
            mime_type,
            file_name: new.file_name.as_deref().map(sanitize_filename),
            size_bytes: new.data.len() as i64,
            content_hash: compute_content_hash(&new.data),
            storage_path: storage_path.clone(),
        };

        let item = match self.media.insert(request).await {
            Ok(item) => item,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    warn!(
                        subsystem = "storage",
                        op = "cleanup",
                        path = %storage_path,
                        error = %cleanup,
                        "Failed to remove orphaned blob"
                    );
                }
                return Err(e);
            }
        };

        info!(
            subsystem = "api",
            component = "media",
            op = "create",
            owner_id = %item.owner_id,
            media_id = %item.id,
            media_type = %item.media_type,
            size_bytes = item.size_bytes,
            has_phash = item.phash.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Media item stored"
        );
        Ok(item)
    }

    pub async fn list(&self, req: ListMediaRequest) -> Result<Vec<MediaItem>> {
        if req.owner_id.trim().is_empty() {
            return Err(Error::InvalidInput("userId is required".to_string()));
        }
        self.media.list(req).await
    }

    pub async fn get(&self, owner_id: &str, id: Uuid) -> Result<MediaItem> {
        self.media.fetch(owner_id, id).await
    }

    /// Apply a partial edit. Changed categories must be in the owner's vocabulary.
    pub async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        req: UpdateMediaRequest,
    ) -> Result<MediaItem> {
        if req.is_empty() {
            return self.media.fetch(owner_id, id).await;
        }
        if let Some(categories) = req.categories.as_ref() {
            self.check_vocabulary(owner_id, categories).await?;
        }
        let item = self.media.update(owner_id, id, req).await?;
        debug!(
            subsystem = "api",
            component = "media",
            op = "update",
            owner_id = %owner_id,
            media_id = %id,
            "Media item updated"
        );
        Ok(item)
    }

    /// The item together with its stored bytes.
    pub async fn read_file(&self, owner_id: &str, id: Uuid) -> Result<(MediaItem, Vec<u8>)> {
        let item = self.media.fetch(owner_id, id).await?;
        let data = self.storage.read(&item.storage_path).await?;
        Ok((item, data))
    }

    /// Ask the vision model for a journal entry about an existing item.
    ///
    /// With `append`, the text is added to the stored journal and persisted.
    pub async fn suggest_journal(
        &self,
        backend: &dyn VisionBackend,
        owner_id: &str,
        media_id: Uuid,
        style: JournalStyle,
        append: bool,
    ) -> Result<JournalSuggestion> {
        let start = Instant::now();
        let (item, data) = self.read_file(owner_id, media_id).await?;

        let prompt = journal_prompt(style, item.media_type, &item.description);
        let call = backend.analyze(&data, &item.mime_type, &prompt);
        let text = tokio::time::timeout(self.vision_timeout, call)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "{} did not answer within {} s",
                    backend.provider(),
                    self.vision_timeout.as_secs()
                ))
            })??;

        let suggestion = text.trim().to_string();
        if suggestion.is_empty() {
            return Err(Error::Inference("Model returned an empty suggestion".to_string()));
        }

        let journal = if append {
            let journal = append_journal(&item.journal, &suggestion);
            let update = UpdateMediaRequest {
                journal: Some(journal.clone()),
                ..Default::default()
            };
            self.media.update(owner_id, media_id, update).await?;
            Some(journal)
        } else {
            None
        };

        info!(
            subsystem = "inference",
            component = backend.provider(),
            op = "journal",
            owner_id = %owner_id,
            media_id = %media_id,
            model = backend.model_name(),
            style = %style,
            appended = append,
            duration_ms = start.elapsed().as_millis() as u64,
            "Journal suggestion generated"
        );
        Ok(JournalSuggestion {
            suggestion,
            journal,
        })
    }

    async fn check_vocabulary(&self, owner_id: &str, categories: &[String]) -> Result<()> {
        if categories.is_empty() {
            return Ok(());
        }
        let vocabulary = vocabulary_names(&self.categories.list_for_owner(owner_id).await?);
        let unknown: Vec<&str> = categories
            .iter()
            .filter(|c| !vocabulary.contains(*c))
            .map(String::as_str)
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "Unknown categories: {}",
                unknown.join(", ")
            )))
        }
    }
}
