//! In-memory repositories and a spawned server for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use galleria_api::{build_router, AppState, PipelineLimits, ServerConfig};
use galleria_core::{
    Category, CategoryRepository, CreateMediaRequest, DctHasher, Error, ListMediaRequest,
    MediaItem, MediaRepository, MediaType, PerceptualHasher, Result, UpdateMediaRequest,
};
use galleria_db::{validate_category_name, StorageBackend};
use galleria_inference::mock::MockVisionBackend;
use galleria_inference::VisionBackend;

// =============================================================================
// REPOSITORIES
// =============================================================================

#[derive(Default)]
pub struct MemoryCategories {
    items: Mutex<Vec<Category>>,
    pub fail: AtomicBool,
}

impl MemoryCategories {
    pub fn seed(&self, owner_id: &str, names: &[&str]) {
        let mut items = self.items.lock().unwrap();
        for name in names {
            items.push(Category {
                id: Uuid::now_v7(),
                owner_id: owner_id.to_string(),
                name: name.to_string(),
                created_at_utc: Utc::now(),
            });
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Internal("category store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Category>> {
        self.check()?;
        let mut found: Vec<Category> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn create(&self, owner_id: &str, name: &str) -> Result<Category> {
        self.check()?;
        let name = validate_category_name(name).map_err(Error::InvalidInput)?;
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|c| c.owner_id == owner_id && c.name == name) {
            return Err(Error::Conflict(format!("Category '{}' already exists", name)));
        }
        let category = Category {
            id: Uuid::now_v7(),
            owner_id: owner_id.to_string(),
            name,
            created_at_utc: Utc::now(),
        };
        items.push(category.clone());
        Ok(category)
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        self.check()?;
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|c| !(c.owner_id == owner_id && c.id == id));
        if items.len() == before {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }

    async fn ensure_names(&self, owner_id: &str, names: &[&str]) -> Result<Vec<Category>> {
        self.check()?;
        for name in names {
            match self.create(owner_id, name).await {
                Ok(_) | Err(Error::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.list_for_owner(owner_id).await
    }
}

#[derive(Default)]
pub struct MemoryMedia {
    items: Mutex<Vec<MediaItem>>,
    pub fail_lookup: AtomicBool,
    pub fail_insert: AtomicBool,
    pub lookups: AtomicUsize,
}

impl MemoryMedia {
    pub fn all(&self) -> Vec<MediaItem> {
        self.items.lock().unwrap().clone()
    }

    /// Insert an item directly, bypassing storage.
    pub fn put(&self, owner_id: &str, media_type: MediaType, phash: Option<&str>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::now_v7();
        self.items.lock().unwrap().push(MediaItem {
            id,
            owner_id: owner_id.to_string(),
            media_type,
            phash: phash.map(str::to_string),
            description: String::new(),
            categories: vec![],
            journal: String::new(),
            mime_type: format!("{}png", media_type.mime_prefix()),
            file_name: None,
            size_bytes: 1,
            content_hash: "blake3:00".to_string(),
            storage_path: format!("media/00/00/{}.bin", id),
            created_at_utc: now,
            updated_at_utc: now,
        });
        id
    }
}

#[async_trait]
impl MediaRepository for MemoryMedia {
    async fn insert(&self, req: CreateMediaRequest) -> Result<MediaItem> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::Internal("media store unavailable".to_string()));
        }
        let now = Utc::now();
        let item = MediaItem {
            id: req.id,
            owner_id: req.owner_id,
            media_type: req.media_type,
            phash: req.phash,
            description: req.description,
            categories: req.categories,
            journal: req.journal,
            mime_type: req.mime_type,
            file_name: req.file_name,
            size_bytes: req.size_bytes,
            content_hash: req.content_hash,
            storage_path: req.storage_path,
            created_at_utc: now,
            updated_at_utc: now,
        };
        self.items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn fetch(&self, owner_id: &str, id: Uuid) -> Result<MediaItem> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.owner_id == owner_id && m.id == id)
            .cloned()
            .ok_or(Error::MediaNotFound(id))
    }

    async fn list(&self, req: ListMediaRequest) -> Result<Vec<MediaItem>> {
        let items = self.items.lock().unwrap();
        let offset = req.offset.unwrap_or(0).max(0) as usize;
        let limit = req.limit.unwrap_or(50).clamp(1, 200) as usize;
        Ok(items
            .iter()
            .rev()
            .filter(|m| m.owner_id == req.owner_id)
            .filter(|m| req.media_type.map_or(true, |t| m.media_type == t))
            .filter(|m| {
                req.category
                    .as_ref()
                    .map_or(true, |c| m.categories.contains(c))
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_duplicate(
        &self,
        owner_id: &str,
        media_type: MediaType,
        phash: &str,
    ) -> Result<Option<MediaItem>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Error::Internal("duplicate index unavailable".to_string()));
        }
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|m| {
                m.owner_id == owner_id
                    && m.media_type == media_type
                    && m.phash.as_deref() == Some(phash)
            })
            .cloned())
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        req: UpdateMediaRequest,
    ) -> Result<MediaItem> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|m| m.owner_id == owner_id && m.id == id)
            .ok_or(Error::MediaNotFound(id))?;
        if let Some(description) = req.description {
            item.description = description;
        }
        if let Some(categories) = req.categories {
            item.categories = categories;
        }
        if let Some(journal) = req.journal {
            item.journal = journal;
        }
        item.updated_at_utc = Utc::now();
        Ok(item.clone())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", path)))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.blobs.lock().unwrap().remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(path))
    }
}

// =============================================================================
// HASHER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherMode {
    Real,
    Fail,
    /// Block for the given time before hashing.
    Slow(Duration),
}

/// DCT hasher that counts calls and can be told to misbehave.
pub struct CountingHasher {
    inner: DctHasher,
    mode: HasherMode,
    pub calls: AtomicUsize,
}

impl CountingHasher {
    pub fn new(mode: HasherMode) -> Self {
        Self {
            inner: DctHasher::new(),
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PerceptualHasher for CountingHasher {
    fn hash(&self, image_data: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            HasherMode::Real => self.inner.hash(image_data),
            HasherMode::Fail => Err(Error::Hashing("decoder exploded".to_string())),
            HasherMode::Slow(delay) => {
                std::thread::sleep(delay);
                self.inner.hash(image_data)
            }
        }
    }
}

// =============================================================================
// FIXTURE
// =============================================================================

pub struct Fixture {
    pub categories: Arc<MemoryCategories>,
    pub media: Arc<MemoryMedia>,
    pub storage: Arc<MemoryStorage>,
    pub hasher: Arc<CountingHasher>,
    pub vision: MockVisionBackend,
    pub limits: PipelineLimits,
}

impl Fixture {
    pub fn new(vision: MockVisionBackend) -> Self {
        Self {
            categories: Arc::new(MemoryCategories::default()),
            media: Arc::new(MemoryMedia::default()),
            storage: Arc::new(MemoryStorage::default()),
            hasher: Arc::new(CountingHasher::new(HasherMode::Real)),
            vision,
            limits: PipelineLimits {
                hash_timeout: Duration::from_secs(5),
                vision_timeout: Duration::from_secs(5),
            },
        }
    }

    pub fn with_hasher(mut self, mode: HasherMode) -> Self {
        self.hasher = Arc::new(CountingHasher::new(mode));
        self
    }

    pub fn with_limits(mut self, hash_timeout: Duration, vision_timeout: Duration) -> Self {
        self.limits = PipelineLimits {
            hash_timeout,
            vision_timeout,
        };
        self
    }

    pub fn state(&self) -> AppState {
        let vision: Arc<dyn VisionBackend> = Arc::new(self.vision.clone());
        self.state_without_vision().with_vision(Some(vision))
    }

    pub fn state_without_vision(&self) -> AppState {
        AppState::new(
            self.categories.clone(),
            self.media.clone(),
            self.storage.clone(),
        )
        .with_hasher(self.hasher.clone())
        .with_limits(self.limits)
    }
}

/// Serve the full router on an ephemeral port and return its base URL.
pub async fn spawn_server(state: AppState) -> String {
    let router = build_router(state, &ServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Give server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{}", addr)
}

// =============================================================================
// MEDIA
// =============================================================================

/// A small PNG. Different `variant`s give visibly different pictures.
pub fn png_bytes(variant: u8) -> Vec<u8> {
    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        let v = match variant % 3 {
            0 => (x * 4) as u8,
            1 => (y * 4) as u8,
            _ => {
                if (x / 8 + y / 8) % 2 == 0 {
                    255
                } else {
                    0
                }
            }
        };
        image::Rgb([v, v, v])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .unwrap();
    buf
}

/// An MP4 `ftyp` header padded with zeros to `len` bytes.
pub fn mp4_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0, 0, 0, 0x18];
    buf.extend_from_slice(b"ftypmp42");
    buf.resize(len.max(buf.len()), 0);
    buf
}

/// A JPEG start-of-image marker padded to `len` bytes.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0xFF, 0xD8, 0xFF, 0xE0];
    buf.resize(len.max(buf.len()), 0);
    buf
}

/// Multipart form with the three fields every upload carries.
pub fn media_form(owner: &str, kind: &str, data: Vec<u8>, mime: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name("upload.bin")
        .mime_str(mime)
        .unwrap();
    reqwest::multipart::Form::new()
        .text("userId", owner.to_string())
        .text("type", kind.to_string())
        .part("file", part)
}
