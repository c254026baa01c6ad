//! Upload-and-enrich pipeline.
//!
//! For one upload: load the owner's category vocabulary, fingerprint images
//! and stop early on an exact duplicate, otherwise ask the vision model for a
//! caption and categories. Only the vocabulary lookup is fatal. Hashing,
//! the duplicate lookup and the model call all degrade to "no information"
//! and the request still succeeds. Nothing is written.
//!
//! The duplicate check and the later create are not atomic. Two concurrent
//! uploads of the same picture can both pass the check.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

use galleria_core::{
    resolve_mime_type, vocabulary_names, CategoryRepository, Error, MediaRepository, MediaType,
    PerceptualHasher, Result, Suggestions,
};
use galleria_inference::{decode_suggestions, suggestion_prompt, VisionBackend};

use super::hashing::fingerprint_or_none;

/// One uploaded file awaiting suggestions.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: String,
    pub media_type: MediaType,
    pub data: Bytes,
    /// MIME type declared by the client, if any.
    pub mime_type: Option<String>,
}

/// Result of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The owner already has an image with the same fingerprint.
    Duplicate { existing_id: Uuid },
    /// Suggestions (possibly empty) for the new file.
    Suggested {
        suggestions: Suggestions,
        phash: Option<String>,
    },
}

/// Upload orchestrator.
#[derive(Clone)]
pub struct UploadService {
    categories: Arc<dyn CategoryRepository>,
    media: Arc<dyn MediaRepository>,
    hasher: Arc<dyn PerceptualHasher>,
    vision: Option<Arc<dyn VisionBackend>>,
    hash_timeout: Duration,
    vision_timeout: Duration,
}

impl UploadService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        media: Arc<dyn MediaRepository>,
        hasher: Arc<dyn PerceptualHasher>,
        vision: Option<Arc<dyn VisionBackend>>,
        hash_timeout: Duration,
        vision_timeout: Duration,
    ) -> Self {
        Self {
            categories,
            media,
            hasher,
            vision,
            hash_timeout,
            vision_timeout,
        }
    }

    /// Run the pipeline for one upload.
    pub async fn process(&self, req: UploadRequest) -> Result<UploadOutcome> {
        if req.owner_id.trim().is_empty() || req.data.is_empty() {
            return Err(Error::InvalidInput("Missing required fields".to_string()));
        }
        let start = Instant::now();
        let owner_id = req.owner_id.as_str();

        let vocabulary = vocabulary_names(&self.categories.list_for_owner(owner_id).await?);
        debug!(
            subsystem = "api",
            component = "upload",
            op = "vocabulary",
            owner_id = %owner_id,
            vocabulary_size = vocabulary.len(),
            "Vocabulary loaded"
        );

        let mut phash = None;
        if req.media_type == MediaType::Image {
            phash =
                fingerprint_or_none(self.hasher.clone(), req.data.clone(), self.hash_timeout, owner_id)
                    .await;

            if let Some(hash) = phash.as_deref() {
                if let Some(existing_id) = self.find_duplicate(owner_id, hash).await {
                    info!(
                        subsystem = "api",
                        component = "upload",
                        owner_id = %owner_id,
                        media_id = %existing_id,
                        is_duplicate = true,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Upload matches an existing image"
                    );
                    return Ok(UploadOutcome::Duplicate { existing_id });
                }
            }
        }

        let mime_type = resolve_mime_type(req.mime_type.as_deref(), &req.data);
        let raw = self
            .ask_model(owner_id, req.media_type, &mime_type, &req.data, &vocabulary)
            .await;
        let suggestions = decode_suggestions(&raw, &vocabulary).into_suggestions();

        info!(
            subsystem = "api",
            component = "upload",
            owner_id = %owner_id,
            media_type = %req.media_type,
            is_duplicate = false,
            size_bytes = req.data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload processed for suggestions"
        );
        Ok(UploadOutcome::Suggested { suggestions, phash })
    }

    /// Exact-fingerprint lookup. A failed lookup counts as "no duplicate".
    async fn find_duplicate(&self, owner_id: &str, phash: &str) -> Option<Uuid> {
        match self
            .media
            .find_duplicate(owner_id, MediaType::Image, phash)
            .await
        {
            Ok(found) => found.map(|item| item.id),
            Err(e) => {
                warn!(
                    subsystem = "api",
                    component = "upload",
                    op = "duplicate_check",
                    owner_id = %owner_id,
                    error = %e,
                    "Duplicate lookup failed, continuing"
                );
                None
            }
        }
    }

    /// Raw model answer, or an empty string when the model is unavailable.
    async fn ask_model(
        &self,
        owner_id: &str,
        media_type: MediaType,
        mime_type: &str,
        data: &[u8],
        vocabulary: &[String],
    ) -> String {
        let Some(backend) = self.vision.as_ref() else {
            debug!(
                subsystem = "api",
                component = "upload",
                "No vision backend configured, skipping suggestions"
            );
            return String::new();
        };

        let prompt = suggestion_prompt(media_type, vocabulary);
        let call = backend.analyze(data, mime_type, &prompt);
        match tokio::time::timeout(self.vision_timeout, call).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(
                    subsystem = "inference",
                    component = backend.provider(),
                    op = "analyze",
                    owner_id = %owner_id,
                    model = backend.model_name(),
                    error = %e,
                    "Vision call failed, returning empty suggestions"
                );
                String::new()
            }
            Err(_) => {
                warn!(
                    subsystem = "inference",
                    component = backend.provider(),
                    op = "analyze",
                    owner_id = %owner_id,
                    model = backend.model_name(),
                    duration_ms = self.vision_timeout.as_millis() as u64,
                    "Vision call timed out, returning empty suggestions"
                );
                String::new()
            }
        }
    }
}
