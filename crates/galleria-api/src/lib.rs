//! # galleria-api
//!
//! HTTP API for the galleria media service: upload-time duplicate detection
//! and AI suggestions, the media library, and category vocabularies.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use galleria_core::defaults::CORS_MAX_AGE_SECS;

pub use config::ServerConfig;
pub use error::ApiError;
pub use state::{AppState, PipelineLimits};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Galleria API",
        description = "Personal photo and video gallery with duplicate detection and AI captions"
    ),
    paths(
        handlers::upload::upload,
        handlers::media::create_media,
        handlers::media::list_media,
        handlers::media::get_media,
        handlers::media::update_media,
        handlers::media::media_file,
        handlers::media::suggest_journal,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::delete_category,
        handlers::categories::seed_default_categories,
        handlers::health::health_check,
    ),
    components(schemas(
        galleria_core::MediaItem,
        galleria_core::MediaType,
        galleria_core::Category,
        galleria_core::Suggestions,
        galleria_core::JournalStyle,
        handlers::upload::UploadResponse,
        handlers::media::UpdateMediaBody,
        handlers::media::SuggestJournalBody,
        handlers::media::SuggestJournalResponse,
        handlers::categories::CreateCategoryBody,
        handlers::categories::OwnerBody,
        handlers::health::HealthResponse,
        handlers::health::VisionHealth,
    )),
    tags(
        (name = "Upload", description = "Duplicate check and suggestions for a new file"),
        (name = "Media", description = "Stored photos and videos"),
        (name = "Categories", description = "Per-user category vocabulary"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/upload", post(handlers::upload::upload))
        .route(
            "/api/media",
            get(handlers::media::list_media).post(handlers::media::create_media),
        )
        .route("/api/media/suggest", post(handlers::media::suggest_journal))
        .route("/api/media/file/:id", get(handlers::media::media_file))
        .route(
            "/api/media/:id",
            get(handlers::media::get_media).patch(handlers::media::update_media),
        )
        .route(
            "/api/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/api/categories/defaults",
            post(handlers::categories::seed_default_categories),
        )
        .route(
            "/api/categories/:id",
            delete(handlers::categories::delete_category),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(config))
        // Multipart extraction has its own 2 MB default; videos need more.
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(CORS_MAX_AGE_SECS));

    if config.cors_allowed_origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer
            .allow_origin(AllowOrigin::list(config.cors_allowed_origins.clone()))
            .allow_credentials(true)
    }
}
