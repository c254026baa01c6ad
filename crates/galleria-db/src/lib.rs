//! # galleria-db
//!
//! PostgreSQL database layer for galleria.
//!
//! This crate provides:
//! - Connection pool management
//! - An explicitly initialised, idempotent database handle
//! - Category vocabulary and media item repositories
//! - Filesystem blob storage for media bytes
//!
//! ## Example
//!
//! ```rust,ignore
//! use galleria_db::{DatabaseHandle, CategoryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handle = DatabaseHandle::new("postgres://localhost/galleria");
//!     let db = handle.connect().await?;
//!     let vocabulary = db.categories.list_for_owner("user-1").await?;
//!     println!("{} categories", vocabulary.len());
//!     Ok(())
//! }
//! ```
pub mod categories;
pub mod file_storage;
pub mod media;
pub mod pool;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

// Re-export core types
pub use galleria_core::*;

pub use categories::{validate_category_name, PgCategoryRepository};
pub use file_storage::{
    compute_content_hash, generate_storage_path, FilesystemBackend, StorageBackend,
};
pub use media::PgMediaRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Per-owner category vocabulary.
    pub categories: Arc<PgCategoryRepository>,
    /// Media items and the duplicate index.
    pub media: Arc<PgMediaRepository>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            media: Arc::new(PgMediaRepository::new(pool.clone())),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

/// Lazily connected, shared database handle.
///
/// The first successful `connect` opens the pool; later calls, including
/// concurrent ones, return the same `Database`. A failed attempt leaves the
/// handle unset so the next call retries.
pub struct DatabaseHandle {
    url: String,
    config: PoolConfig,
    db: OnceCell<Database>,
}

impl DatabaseHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, PoolConfig::default())
    }

    pub fn with_config(url: impl Into<String>, config: PoolConfig) -> Self {
        Self {
            url: url.into(),
            config,
            db: OnceCell::new(),
        }
    }

    /// Connect if not already connected, and return the shared database.
    pub async fn connect(&self) -> Result<&Database> {
        self.db
            .get_or_try_init(|| async {
                let db = Database::connect_with_config(&self.url, self.config.clone()).await?;
                info!(subsystem = "db", op = "connect", "Database handle initialised");
                Ok::<_, Error>(db)
            })
            .await
    }

    /// The database, if `connect` has succeeded.
    pub fn get(&self) -> Option<&Database> {
        self.db.get()
    }

    pub fn is_connected(&self) -> bool {
        self.db.initialized()
    }
}
