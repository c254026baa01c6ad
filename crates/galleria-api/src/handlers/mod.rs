//! HTTP handlers for galleria-api.

pub mod categories;
pub mod health;
pub mod media;
pub mod upload;

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use serde::Deserialize;
use utoipa::IntoParams;

use galleria_core::MediaType;

use crate::ApiError;

/// Message for an upload lacking the file, the owner or the type.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

/// `?userId=` on owner-scoped routes.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl OwnerQuery {
    pub fn owner(self) -> Result<String, ApiError> {
        require_owner(self.user_id)
    }
}

pub(crate) fn require_owner(user_id: Option<String>) -> Result<String, ApiError> {
    user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))
}

/// The uploaded file part of a multipart form.
#[derive(Debug, Clone)]
pub(crate) struct FilePart {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// A drained multipart form: the `file` part plus every text field.
#[derive(Debug, Default)]
pub(crate) struct MediaForm {
    pub file: Option<FilePart>,
    pub fields: HashMap<String, String>,
}

impl MediaForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MediaForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "file" {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?;
                form.file = Some(FilePart {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Non-blank text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// The file, owner and media type every media form carries.
    pub fn required(&mut self) -> Result<(FilePart, String, MediaType), ApiError> {
        let missing = || ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string());
        let owner = self.text("userId").map(str::to_string).ok_or_else(missing)?;
        let kind = self.text("type").map(str::to_string).ok_or_else(missing)?;
        let file = self
            .file
            .take()
            .filter(|f| !f.data.is_empty())
            .ok_or_else(missing)?;
        let media_type = kind.parse::<MediaType>()?;
        Ok((file, owner, media_type))
    }
}
