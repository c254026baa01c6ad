//! Health check.

use std::time::Duration;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use galleria_core::defaults::HEALTH_CHECK_TIMEOUT_SECS;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Absent when no vision backend is configured.
    pub vision: Option<VisionHealth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisionHealth {
    pub provider: String,
    pub model: String,
    pub reachable: bool,
}

/// Service status. An unreachable vision backend degrades suggestions but
/// leaves the service healthy.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service status", body = HealthResponse)))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let vision = match state.vision.as_ref() {
        Some(backend) => {
            let probe = backend.health_check();
            let reachable =
                match tokio::time::timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS), probe)
                    .await
                {
                    Ok(Ok(ok)) => ok,
                    Ok(Err(_)) | Err(_) => false,
                };
            Some(VisionHealth {
                provider: backend.provider().to_string(),
                model: backend.model_name().to_string(),
                reachable,
            })
        }
        None => None,
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        vision,
    })
}
