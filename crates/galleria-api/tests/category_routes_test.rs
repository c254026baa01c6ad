//! Category vocabulary routes, health and CORS, driven through the router.

mod helpers;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use galleria_api::{build_router, ServerConfig};
use galleria_inference::mock::MockVisionBackend;
use helpers::Fixture;

fn router(fixture: &Fixture) -> Router {
    build_router(fixture.state(), &ServerConfig::default())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_and_list_categories() {
    let fixture = Fixture::new(MockVisionBackend::new());

    let (status, created) = send(
        router(&fixture),
        json_request(
            Method::POST,
            "/api/categories",
            json!({ "userId": "alice", "name": "  Road trips " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Road trips");

    send(
        router(&fixture),
        json_request(
            Method::POST,
            "/api/categories",
            json!({ "userId": "alice", "name": "Beach" }),
        ),
    )
    .await;

    let (status, listed) = send(router(&fixture), get("/api/categories?userId=alice")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Beach", "Road trips"]);

    let (_, other) = send(router(&fixture), get("/api/categories?userId=bob")).await;
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn test_duplicate_category_conflicts() {
    let fixture = Fixture::new(MockVisionBackend::new());
    fixture.categories.seed("alice", &["Beach"]);

    let (status, body) = send(
        router(&fixture),
        json_request(
            Method::POST,
            "/api/categories",
            json!({ "userId": "alice", "name": "Beach" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("Beach"));
}

#[tokio::test]
async fn test_invalid_category_names_rejected() {
    let fixture = Fixture::new(MockVisionBackend::new());

    for name in ["   ".to_string(), "x".repeat(51)] {
        let (status, _) = send(
            router(&fixture),
            json_request(
                Method::POST,
                "/api/categories",
                json!({ "userId": "alice", "name": name }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = send(
        router(&fixture),
        json_request(Method::POST, "/api/categories", json!({ "name": "Beach" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "userId is required");
}

#[tokio::test]
async fn test_delete_category_is_owner_scoped() {
    let fixture = Fixture::new(MockVisionBackend::new());
    fixture.categories.seed("alice", &["Beach"]);
    let (_, listed) = send(router(&fixture), get("/api/categories?userId=alice")).await;
    let id = listed[0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        router(&fixture),
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/categories/{}?userId=mallory", id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");

    let (status, _) = send(
        router(&fixture),
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/categories/{}?userId=alice", id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, listed) = send(router(&fixture), get("/api/categories?userId=alice")).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_seed_defaults_is_idempotent() {
    let fixture = Fixture::new(MockVisionBackend::new());
    fixture.categories.seed("alice", &["Beach", "Knitting"]);

    let request = || {
        json_request(
            Method::POST,
            "/api/categories/defaults",
            json!({ "userId": "alice" }),
        )
    };
    let (status, first) = send(router(&fixture), request()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(router(&fixture), request()).await;

    // Ten defaults plus the custom one, Beach not repeated
    assert_eq!(first.as_array().unwrap().len(), 11);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_reports_vision_backend() {
    let fixture = Fixture::new(MockVisionBackend::new().with_health(false));

    let (status, body) = send(router(&fixture), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(
        body["vision"],
        json!({ "provider": "mock", "model": "mock-vision", "reachable": false })
    );

    let bare = build_router(fixture.state_without_vision(), &ServerConfig::default());
    let (_, body) = send(bare, get("/health")).await;
    assert!(body["vision"].is_null());
}

#[tokio::test]
async fn test_openapi_document_served() {
    let fixture = Fixture::new(MockVisionBackend::new());

    let (status, body) = send(router(&fixture), get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/upload"]["post"].is_object());
    assert!(body["paths"]["/api/media/{id}"]["patch"].is_object());
}

#[tokio::test]
async fn test_cors_allow_list() {
    let fixture = Fixture::new(MockVisionBackend::new());
    let config = ServerConfig {
        cors_allowed_origins: galleria_api::config::parse_allowed_origins(
            "https://gallery.example",
        ),
        ..ServerConfig::default()
    };
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/categories")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = build_router(fixture.state(), &config)
        .oneshot(preflight("https://gallery.example"))
        .await
        .unwrap();
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://gallery.example"
    );

    let denied = build_router(fixture.state(), &config)
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(denied
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
