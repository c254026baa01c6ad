//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Generic message for failures whose details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    /// No vision backend is configured.
    ServiceUnavailable(String),
    /// The vision backend failed or timed out.
    BadGateway(String),
    /// Anything else. The message is logged, never returned.
    Internal(String),
}

impl From<galleria_core::Error> for ApiError {
    fn from(err: galleria_core::Error) -> Self {
        use galleria_core::Error;
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::MediaNotFound(_) => ApiError::NotFound("Media item not found".to_string()),
            Error::CategoryNotFound(_) => ApiError::NotFound("Category not found".to_string()),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Database(ref sqlx_err)
                if sqlx_err
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false) =>
            {
                ApiError::Conflict("Resource already exists".to_string())
            }
            Error::Inference(msg) => ApiError::BadGateway(format!("Vision model error: {}", msg)),
            Error::Request(msg) => ApiError::BadGateway(format!("Vision model unreachable: {}", msg)),
            Error::Timeout(msg) => ApiError::BadGateway(format!("Vision model timed out: {}", msg)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => {
                error!(subsystem = "api", error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galleria_core::Error;
    use uuid::Uuid;

    fn status_of(err: Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_core_error_status_mapping() {
        assert_eq!(status_of(Error::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::MediaNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::CategoryNotFound(Uuid::nil())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(Error::Inference("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(Error::Timeout("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(status_of(Error::Hashing("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_of(Error::Internal("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = ApiError::Internal("connection refused at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Internal server error" }));
    }
}
