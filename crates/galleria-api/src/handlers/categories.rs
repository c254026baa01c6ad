//! Category vocabulary handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use galleria_core::{defaults::DEFAULT_CATEGORIES, Category};

use super::{require_owner, OwnerQuery};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryBody {
    pub user_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerBody {
    pub user_id: Option<String>,
}

/// The owner's vocabulary, by name.
#[utoipa::path(get, path = "/api/categories", tag = "Categories",
    params(OwnerQuery),
    responses((status = 200, description = "Categories", body = Vec<Category>)))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let owner_id = owner.owner()?;
    Ok(Json(state.categories.list_for_owner(&owner_id).await?))
}

#[utoipa::path(post, path = "/api/categories", tag = "Categories",
    request_body = CreateCategoryBody,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid name"),
        (status = 409, description = "Name already in use"),
    ))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = require_owner(body.user_id)?;
    let category = state.categories.create(&owner_id, &body.name).await?;
    info!(
        subsystem = "api",
        component = "categories",
        op = "create",
        owner_id = %owner_id,
        category_id = %category.id,
        "Category created"
    );
    Ok((StatusCode::CREATED, Json(category)))
}

/// Remove a category from the vocabulary. Items keep the name they carry.
#[utoipa::path(delete, path = "/api/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id"), OwnerQuery),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found"),
    ))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Result<StatusCode, ApiError> {
    let owner_id = owner.owner()?;
    state.categories.delete(&owner_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add any missing default categories. Returns the full vocabulary.
#[utoipa::path(post, path = "/api/categories/defaults", tag = "Categories",
    request_body = OwnerBody,
    responses((status = 200, description = "Vocabulary after seeding", body = Vec<Category>)))]
pub async fn seed_default_categories(
    State(state): State<AppState>,
    Json(body): Json<OwnerBody>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let owner_id = require_owner(body.user_id)?;
    let vocabulary = state
        .categories
        .ensure_names(&owner_id, &DEFAULT_CATEGORIES)
        .await?;
    Ok(Json(vocabulary))
}
