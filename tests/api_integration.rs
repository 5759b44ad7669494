//! HTTP API integration tests
//!
//! These tests exercise the router end to end: header-derived identities,
//! response shapes for success and storage failure, the platform probe, and
//! CORS on the `/api/*` surface.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use footfall::api;
use footfall::config::{CorsConfig, FrontendConfig};
use footfall::models::{ClientIdentity, LedgerStats, VisitRecord};
use footfall::storage::{SqliteStorage, Storage, StorageError, StorageResult};
use footfall::visit::VisitService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Helper to create test storage
async fn create_test_storage() -> Arc<dyn Storage> {
    Arc::new(SqliteStorage::new("sqlite::memory:", 1).await.unwrap())
}

fn create_test_app(storage: Arc<dyn Storage>, cors: CorsConfig) -> Router {
    api::create_api_router(
        VisitService::new(storage, 86_400),
        "Cloudflare".to_string(),
        &cors,
        &FrontendConfig::default(),
    )
}

fn visit_request(headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/visit-count");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_visit_count_response_shape() {
    let app = create_test_app(create_test_storage().await, CorsConfig::default());

    let (status, json) = send(
        &app,
        visit_request(&[("cf-connecting-ip", "203.0.113.1"), ("user-agent", IPHONE_UA)]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "count": 1, "isMobile": true }));
}

#[tokio::test]
async fn test_repeat_request_returns_same_count() {
    let app = create_test_app(create_test_storage().await, CorsConfig::default());
    let headers = [("x-forwarded-for", "198.51.100.4"), ("user-agent", DESKTOP_UA)];

    let (_, first) = send(&app, visit_request(&headers)).await;
    let (_, second) = send(&app, visit_request(&headers)).await;
    let (_, third) = send(&app, visit_request(&headers)).await;

    assert_eq!(first["count"], 1);
    assert_eq!(second["count"], 1);
    assert_eq!(third["count"], 1);
    assert_eq!(third["isMobile"], false);
}

#[tokio::test]
async fn test_missing_ip_and_user_agent_still_counts() {
    let storage = create_test_storage().await;
    let app = create_test_app(Arc::clone(&storage), CorsConfig::default());

    let (status, json) = send(&app, visit_request(&[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "count": 1, "isMobile": false }));

    // Every header-less caller collapses onto the "unknown" identity
    let record = storage
        .get_record(&ClientIdentity::new(None, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.ip, "unknown");
    assert_eq!(record.user_agent, "unknown");

    let (_, again) = send(&app, visit_request(&[])).await;
    assert_eq!(again["count"], 1);
}

#[tokio::test]
async fn test_cloudflare_ip_takes_precedence() {
    let storage = create_test_storage().await;
    let app = create_test_app(Arc::clone(&storage), CorsConfig::default());

    send(
        &app,
        visit_request(&[
            ("cf-connecting-ip", "203.0.113.9"),
            ("x-forwarded-for", "198.51.100.4"),
            ("user-agent", DESKTOP_UA),
        ]),
    )
    .await;

    let by_cf = ClientIdentity::new(Some("203.0.113.9"), Some(DESKTOP_UA));
    let by_xff = ClientIdentity::new(Some("198.51.100.4"), Some(DESKTOP_UA));
    assert!(storage.get_record(&by_cf).await.unwrap().is_some());
    assert!(storage.get_record(&by_xff).await.unwrap().is_none());
}

/// Ledger double that fails every call
struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn ensure_schema(&self) -> StorageResult<()> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn get_count(&self) -> StorageResult<i64> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn find_recent_record(
        &self,
        _identity: &ClientIdentity,
        _window_start: i64,
    ) -> StorageResult<Option<VisitRecord>> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn increment_and_record(
        &self,
        _identity: &ClientIdentity,
        _now: i64,
    ) -> StorageResult<i64> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn get_record(&self, _identity: &ClientIdentity) -> StorageResult<Option<VisitRecord>> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }

    async fn stats(&self) -> StorageResult<LedgerStats> {
        Err(StorageError::Other(anyhow::anyhow!("connection refused")))
    }
}

#[tokio::test]
async fn test_storage_failure_returns_degraded_payload() {
    let app = create_test_app(Arc::new(FailingStorage), CorsConfig::default());

    let (status, json) = send(&app, visit_request(&[("user-agent", IPHONE_UA)])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "count": 0, "error": "Database error" }));
}

#[tokio::test]
async fn test_platform_probe() {
    let app = create_test_app(create_test_storage().await, CorsConfig::default());

    for uri in ["/api/", "/api"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}");
        assert_eq!(json, json!({ "name": "Cloudflare" }));
    }
}

#[tokio::test]
async fn test_visit_count_rejects_get() {
    let app = create_test_app(create_test_storage().await, CorsConfig::default());

    let request = Request::builder()
        .uri("/api/visit-count")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let app = create_test_app(create_test_storage().await, CorsConfig::default());

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/visit-count")
        .header("origin", "https://fans.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*",
        "preflight must be answered for any origin"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visit-count")
                .header("origin", "https://fans.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_cors_respects_configured_origins() {
    let cors = CorsConfig {
        allowed_origins: vec!["https://fans.example".to_string()],
    };
    let app = create_test_app(create_test_storage().await, cors);

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visit-count")
                .header("origin", "https://fans.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "https://fans.example"
    );

    let other = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visit-count")
                .header("origin", "https://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(other
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
