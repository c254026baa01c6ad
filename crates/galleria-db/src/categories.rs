//! Category vocabulary repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use galleria_core::defaults::CATEGORY_NAME_MAX_LENGTH;
use galleria_core::{Category, CategoryRepository, Error, Result};

/// Validate and normalise a category name.
///
/// Surrounding whitespace is trimmed; the result must be 1 to 50 characters.
pub fn validate_category_name(name: &str) -> std::result::Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if trimmed.chars().count() > CATEGORY_NAME_MAX_LENGTH {
        return Err(format!(
            "Category name must be {} characters or less",
            CATEGORY_NAME_MAX_LENGTH
        ));
    }
    Ok(trimmed.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn category_from_row(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        created_at_utc: row.get("created_at_utc"),
    }
}

/// PostgreSQL implementation of CategoryRepository.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

impl PgCategoryRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, created_at_utc
             FROM category
             WHERE owner_id = $1
             ORDER BY name",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn create(&self, owner_id: &str, name: &str) -> Result<Category> {
        let name = validate_category_name(name).map_err(Error::InvalidInput)?;

        let row = sqlx::query(
            "INSERT INTO category (id, owner_id, name, created_at_utc)
             VALUES ($1, $2, $3, $4)
             RETURNING id, owner_id, name, created_at_utc",
        )
        .bind(Uuid::now_v7())
        .bind(owner_id)
        .bind(&name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::Conflict(format!("Category '{}' already exists", name))
            } else {
                Error::Database(e)
            }
        })?;

        Ok(category_from_row(&row))
    }

    async fn delete(&self, owner_id: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CategoryNotFound(id));
        }
        Ok(())
    }

    async fn ensure_names(&self, owner_id: &str, names: &[&str]) -> Result<Vec<Category>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for name in names {
            let name = validate_category_name(name).map_err(Error::InvalidInput)?;
            sqlx::query(
                "INSERT INTO category (id, owner_id, name, created_at_utc)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (owner_id, name) DO NOTHING",
            )
            .bind(Uuid::now_v7())
            .bind(owner_id)
            .bind(&name)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        self.list_for_owner(owner_id).await
    }
}
