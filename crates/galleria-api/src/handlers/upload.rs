//! Upload-for-suggestions handler.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use galleria_core::Suggestions;

use super::MediaForm;
use crate::services::{UploadOutcome, UploadRequest};
use crate::{ApiError, AppState};

pub const DUPLICATE_MESSAGE: &str =
    "Warning: A very similar image already exists in your collection.";
pub const PROCESSED_MESSAGE: &str = "File processed for suggestions";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_duplicate: Option<bool>,
    /// The item the upload duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Suggestions>,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Duplicate { existing_id } => Self {
                message: DUPLICATE_MESSAGE.to_string(),
                is_duplicate: Some(true),
                existing_id: Some(existing_id),
                suggestions: None,
            },
            UploadOutcome::Suggested { suggestions, .. } => Self {
                message: PROCESSED_MESSAGE.to_string(),
                is_duplicate: None,
                existing_id: None,
                suggestions: Some(suggestions),
            },
        }
    }
}

/// Check an upload for duplicates and suggest a caption and categories.
///
/// Multipart fields: `file`, `userId`, `type` (`image` or `video`).
/// Nothing is stored; the client saves the item with `POST /api/media`.
#[utoipa::path(post, path = "/api/upload", tag = "Upload",
    responses(
        (status = 200, description = "Duplicate warning or suggestions", body = UploadResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Internal server error"),
    ))]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut form = MediaForm::read(multipart).await?;
    let (file, owner_id, media_type) = form.required()?;

    let outcome = state
        .uploads()
        .process(UploadRequest {
            owner_id,
            media_type,
            data: file.data,
            mime_type: file.content_type,
        })
        .await?;

    Ok(Json(outcome.into()))
}
