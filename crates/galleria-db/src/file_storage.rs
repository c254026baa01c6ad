//! Blob storage for uploaded media.
//!
//! Media bytes live outside the database. The `media_item` row records the
//! relative `storage_path` and a BLAKE3 `content_hash` of the bytes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use galleria_core::{Error, Result};

/// Opaque blob store addressed by relative path.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path, replacing anything already there.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified path. Missing paths are not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend.
///
/// Path format: `{base_path}/media/{first-2-hex}/{next-2-hex}/{uuid}.bin`
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a relative storage path, refusing anything that escapes the base.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(Error::InvalidInput(format!("Invalid storage path: {}", path)));
        }
        Ok(self.base_path.join(relative))
    }

    /// Write, read back and delete a probe file so misconfigured storage
    /// fails at startup rather than on the first upload.
    pub async fn validate(&self) -> Result<()> {
        let probe = "media/.health-check/probe.bin";
        let data = b"galleria-storage-probe";
        self.write(probe, data).await?;
        let read_back = self.read(probe).await?;
        self.delete(probe).await?;
        if read_back != data {
            return Err(Error::Internal(format!(
                "Storage read-back mismatch under {}",
                self.base_path.display()
            )));
        }
        if let Ok(dir) = self.full_path("media/.health-check") {
            let _ = fs::remove_dir(dir).await;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(
            subsystem = "db",
            component = "file_storage",
            storage_path = %path,
            size_bytes = data.len(),
            "Writing blob"
        );

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "Failed to create blob directory");
                e
            })?;
        }

        // Temp file + rename so readers never see a partial blob
        let temp_path = full_path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(
                from = %temp_path.display(),
                to = %full_path.display(),
                error = %e,
                "Failed to move blob into place"
            );
            e
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        match fs::read(&full_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Blob {}", path)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        if fs::try_exists(&full_path).await? {
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path)?;
        Ok(fs::try_exists(full_path).await?)
    }
}

/// BLAKE3 hash of `data` as `blake3:{64-char-hex}`.
pub fn compute_content_hash(data: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(data).to_hex())
}

/// Storage path for a media item.
///
/// Example: `media/01/94/01948f7e-8b2a-7c3d-9e4f-5a6b7c8d9e0f.bin`
pub fn generate_storage_path(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    format!(
        "media/{}/{}/{}.bin",
        &simple[0..2],
        &simple[2..4],
        id.as_hyphenated()
    )
}
