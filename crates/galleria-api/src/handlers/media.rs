//! Media library handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use galleria_core::file_safety::OCTET_STREAM;
use galleria_core::{
    is_inline_safe, JournalStyle, ListMediaRequest, MediaItem, MediaType, UpdateMediaRequest,
};

use super::{require_owner, MediaForm, OwnerQuery};
use crate::services::NewMedia;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListMediaQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    /// `image` or `video`
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMediaBody {
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub journal: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestJournalBody {
    pub media_id: Uuid,
    pub suggestion_type: JournalStyle,
    pub user_id: Option<String>,
    #[serde(default)]
    pub append: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestJournalResponse {
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}

/// Save a media item.
///
/// Multipart fields: `file`, `userId`, `type`, and optionally `description`,
/// `categories` (a JSON array of names) and `journal`.
#[utoipa::path(post, path = "/api/media", tag = "Media",
    responses(
        (status = 201, description = "Media item stored", body = MediaItem),
        (status = 400, description = "Missing fields, wrong type or unknown categories"),
    ))]
pub async fn create_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = MediaForm::read(multipart).await?;
    let (file, owner_id, media_type) = form.required()?;

    let categories = match form.text("categories") {
        Some(raw) => serde_json::from_str::<Vec<String>>(raw).map_err(|_| {
            ApiError::BadRequest("categories must be a JSON array of names".to_string())
        })?,
        None => Vec::new(),
    };

    let item = state
        .library()
        .create(NewMedia {
            owner_id,
            media_type,
            data: file.data,
            mime_type: file.content_type,
            file_name: file.file_name,
            description: form.text("description").unwrap_or_default().to_string(),
            categories,
            journal: form.text("journal").unwrap_or_default().to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// List the owner's media, newest first.
#[utoipa::path(get, path = "/api/media", tag = "Media",
    params(ListMediaQuery),
    responses((status = 200, description = "Media items", body = Vec<MediaItem>)))]
pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<ListMediaQuery>,
) -> Result<Json<Vec<MediaItem>>, ApiError> {
    let owner_id = require_owner(query.user_id)?;
    let media_type = query
        .media_type
        .as_deref()
        .map(str::parse::<MediaType>)
        .transpose()?;

    let items = state
        .library()
        .list(ListMediaRequest {
            owner_id,
            media_type,
            category: query.category.filter(|c| !c.is_empty()),
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(Json(items))
}

#[utoipa::path(get, path = "/api/media/{id}", tag = "Media",
    params(("id" = Uuid, Path, description = "Media item id"), OwnerQuery),
    responses(
        (status = 200, description = "Media item", body = MediaItem),
        (status = 404, description = "Not found"),
    ))]
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Result<Json<MediaItem>, ApiError> {
    let owner_id = owner.owner()?;
    Ok(Json(state.library().get(&owner_id, id).await?))
}

/// Edit the description, categories or journal of an item.
#[utoipa::path(patch, path = "/api/media/{id}", tag = "Media",
    params(("id" = Uuid, Path, description = "Media item id"), OwnerQuery),
    request_body = UpdateMediaBody,
    responses(
        (status = 200, description = "Updated item", body = MediaItem),
        (status = 400, description = "Unknown categories"),
        (status = 404, description = "Not found"),
    ))]
pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
    Json(body): Json<UpdateMediaBody>,
) -> Result<Json<MediaItem>, ApiError> {
    let owner_id = owner.owner()?;
    let item = state
        .library()
        .update(
            &owner_id,
            id,
            UpdateMediaRequest {
                description: body.description,
                categories: body.categories,
                journal: body.journal,
            },
        )
        .await?;
    Ok(Json(item))
}

/// Stream the stored bytes. Only raster images and common video render
/// inline; everything else downloads as `application/octet-stream`.
#[utoipa::path(get, path = "/api/media/file/{id}", tag = "Media",
    params(("id" = Uuid, Path, description = "Media item id"), OwnerQuery),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "Not found"),
    ))]
pub async fn media_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = owner.owner()?;
    let (item, data) = state.library().read_file(&owner_id, id).await?;

    let (content_type, disposition) = if is_inline_safe(&item.mime_type) {
        (HeaderValue::from_str(&item.mime_type).ok(), "inline")
    } else {
        (None, "attachment")
    };
    let content_type = content_type.unwrap_or(HeaderValue::from_static(OCTET_STREAM));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static(disposition)),
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (header::CACHE_CONTROL, HeaderValue::from_static("private, max-age=3600")),
        ],
        data,
    ))
}

/// Ask the vision model for a journal entry about an item.
///
/// With `append: true` the text is added to the stored journal.
#[utoipa::path(post, path = "/api/media/suggest", tag = "Media",
    request_body = SuggestJournalBody,
    responses(
        (status = 200, description = "Suggestion", body = SuggestJournalResponse),
        (status = 404, description = "Not found"),
        (status = 502, description = "Vision model failed"),
        (status = 503, description = "Vision model not configured"),
    ))]
pub async fn suggest_journal(
    State(state): State<AppState>,
    Json(body): Json<SuggestJournalBody>,
) -> Result<Json<SuggestJournalResponse>, ApiError> {
    let owner_id = require_owner(body.user_id)?;
    let backend = state.vision.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "Vision model not configured. Set GEMINI_API_KEY or VISION_BACKEND=ollama.".into(),
        )
    })?;

    let result = state
        .library()
        .suggest_journal(
            backend.as_ref(),
            &owner_id,
            body.media_id,
            body.suggestion_type,
            body.append,
        )
        .await?;

    Ok(Json(SuggestJournalResponse {
        suggestion: result.suggestion,
        journal: result.journal,
    }))
}
