//! Media item repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use galleria_core::defaults::{PAGE_LIMIT, PAGE_LIMIT_MAX, PAGE_OFFSET};
use galleria_core::{
    CreateMediaRequest, Error, ListMediaRequest, MediaItem, MediaRepository, MediaType, Result,
    UpdateMediaRequest,
};

const MEDIA_COLUMNS: &str = "id, owner_id, media_type, phash, description, categories, journal, \
     mime_type, file_name, size_bytes, content_hash, storage_path, created_at_utc, updated_at_utc";

fn media_from_row(row: &PgRow) -> Result<MediaItem> {
    let media_type: String = row.get("media_type");
    Ok(MediaItem {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        media_type: media_type.parse()?,
        phash: row.get("phash"),
        description: row.get("description"),
        categories: row.get("categories"),
        journal: row.get("journal"),
        mime_type: row.get("mime_type"),
        file_name: row.get("file_name"),
        size_bytes: row.get("size_bytes"),
        content_hash: row.get("content_hash"),
        storage_path: row.get("storage_path"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    })
}

/// Clamp paging parameters to sane bounds.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(PAGE_LIMIT).clamp(1, PAGE_LIMIT_MAX);
    let offset = offset.unwrap_or(PAGE_OFFSET).max(0);
    (limit, offset)
}

/// PostgreSQL implementation of MediaRepository.
pub struct PgMediaRepository {
    pool: Pool<Postgres>,
}

impl PgMediaRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    async fn insert(&self, req: CreateMediaRequest) -> Result<MediaItem> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO media_item ({MEDIA_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             RETURNING {MEDIA_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(req.id)
            .bind(&req.owner_id)
            .bind(req.media_type.as_str())
            .bind(&req.phash)
            .bind(&req.description)
            .bind(&req.categories)
            .bind(&req.journal)
            .bind(&req.mime_type)
            .bind(&req.file_name)
            .bind(req.size_bytes)
            .bind(&req.content_hash)
            .bind(&req.storage_path)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        media_from_row(&row)
    }

    async fn fetch(&self, owner_id: &str, id: Uuid) -> Result<MediaItem> {
        let query = format!("SELECT {MEDIA_COLUMNS} FROM media_item WHERE id = $1 AND owner_id = $2");
        let row = sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::MediaNotFound(id))?;

        media_from_row(&row)
    }

    async fn list(&self, req: ListMediaRequest) -> Result<Vec<MediaItem>> {
        let (limit, offset) = page_bounds(req.limit, req.offset);
        let query = format!(
            "SELECT {MEDIA_COLUMNS} FROM media_item
             WHERE owner_id = $1
               AND ($2::text IS NULL OR media_type = $2)
               AND ($3::text IS NULL OR $3 = ANY(categories))
             ORDER BY created_at_utc DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query(&query)
            .bind(&req.owner_id)
            .bind(req.media_type.map(|t| t.as_str()))
            .bind(&req.category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(media_from_row).collect()
    }

    async fn find_duplicate(
        &self,
        owner_id: &str,
        media_type: MediaType,
        phash: &str,
    ) -> Result<Option<MediaItem>> {
        let query = format!(
            "SELECT {MEDIA_COLUMNS} FROM media_item
             WHERE owner_id = $1 AND media_type = $2 AND phash = $3
             ORDER BY created_at_utc
             LIMIT 1"
        );
        let row = sqlx::query(&query)
            .bind(owner_id)
            .bind(media_type.as_str())
            .bind(phash)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "media",
            op = "duplicate_check",
            owner_id = %owner_id,
            is_duplicate = row.is_some(),
            "Duplicate lookup complete"
        );

        row.as_ref().map(media_from_row).transpose()
    }

    async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        req: UpdateMediaRequest,
    ) -> Result<MediaItem> {
        let query = format!(
            "UPDATE media_item SET
                 description = COALESCE($3, description),
                 categories = COALESCE($4, categories),
                 journal = COALESCE($5, journal),
                 updated_at_utc = $6
             WHERE id = $1 AND owner_id = $2
             RETURNING {MEDIA_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&req.description)
            .bind(&req.categories)
            .bind(&req.journal)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::MediaNotFound(id))?;

        media_from_row(&row)
    }
}
