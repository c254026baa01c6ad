//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use galleria_core::{defaults, CategoryRepository, DctHasher, MediaRepository, PerceptualHasher};
use galleria_db::{Database, StorageBackend};
use galleria_inference::VisionBackend;

use crate::services::{MediaService, UploadService};

/// Time budgets for the enrichment steps.
#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    pub hash_timeout: Duration,
    pub vision_timeout: Duration,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            hash_timeout: Duration::from_millis(defaults::HASH_TIMEOUT_MS),
            vision_timeout: Duration::from_secs(defaults::VISION_TIMEOUT_SECS),
        }
    }
}

/// Application state shared across handlers.
///
/// Everything is injected at startup. Handlers never open connections.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryRepository>,
    pub media: Arc<dyn MediaRepository>,
    pub storage: Arc<dyn StorageBackend>,
    pub hasher: Arc<dyn PerceptualHasher>,
    /// None when no vision backend is configured.
    pub vision: Option<Arc<dyn VisionBackend>>,
    pub limits: PipelineLimits,
}

impl AppState {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        media: Arc<dyn MediaRepository>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            categories,
            media,
            storage,
            hasher: Arc::new(DctHasher::new()),
            vision: None,
            limits: PipelineLimits::default(),
        }
    }

    /// State backed by Postgres repositories.
    pub fn from_database(db: &Database, storage: Arc<dyn StorageBackend>) -> Self {
        Self::new(db.categories.clone(), db.media.clone(), storage)
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn PerceptualHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_vision(mut self, vision: Option<Arc<dyn VisionBackend>>) -> Self {
        self.vision = vision;
        self
    }

    pub fn with_limits(mut self, limits: PipelineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn uploads(&self) -> UploadService {
        UploadService::new(
            self.categories.clone(),
            self.media.clone(),
            self.hasher.clone(),
            self.vision.clone(),
            self.limits.hash_timeout,
            self.limits.vision_timeout,
        )
    }

    pub fn library(&self) -> MediaService {
        MediaService::new(
            self.categories.clone(),
            self.media.clone(),
            self.storage.clone(),
            self.hasher.clone(),
            self.limits.hash_timeout,
            self.limits.vision_timeout,
        )
    }
}
