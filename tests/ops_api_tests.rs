//! Integration Tests for Ops Endpoints
//!
//! Tests full request/response cycle for each ops endpoint, plus one
//! end-to-end pass over a live listener.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use querycache::{api::create_router, AppState, CacheManager};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state() -> AppState {
    AppState::new(Arc::new(CacheManager::new()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_reports_counters() {
    let state = create_test_state();
    state.cache.set("user:1", json!("alice"), None).unwrap();
    state.cache.get("user:1"); // hit
    state.cache.get("user:2"); // miss
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let stats = body_to_json(response.into_body()).await;
    assert_eq!(stats["entries"], 1);
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
    assert_eq!(stats["estimated_load_reduction"], 0.5);
}

// == Invalidate Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint_removes_category() {
    let state = create_test_state();
    state.cache.set("product:1", json!("a"), None).unwrap();
    state.cache.set("product:2", json!("b"), None).unwrap();
    state.cache.set("user:1", json!("c"), None).unwrap();
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"prefix":"product:"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["removed"], 2);
    assert_eq!(body["prefix"], "product:");

    assert_eq!(state.cache.get("product:1"), None);
    assert_eq!(state.cache.get("user:1"), Some(json!("c")));
}

#[tokio::test]
async fn test_invalidate_endpoint_zero_matches() {
    let app = create_router(create_test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"prefix":"order:"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn test_invalidate_endpoint_rejects_empty_prefix() {
    let app = create_router(create_test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"prefix":""}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_to_json(response.into_body()).await;
    assert!(body.get("error").is_some());
}

// == Clear Endpoint Tests ==

#[tokio::test]
async fn test_clear_endpoint_empties_cache() {
    let state = create_test_state();
    state.cache.set("user:1", json!("a"), None).unwrap();
    state.cache.set("product:1", json!("b"), None).unwrap();
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["removed"], 2);
    assert!(state.cache.is_empty());
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router(create_test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert!(body.get("timestamp").is_some());
}

// == Live Listener Test ==

async fn spawn_live_app(app: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_ops_endpoints_over_live_listener() {
    let state = create_test_state();
    state.cache.set("product:1", json!("a"), None).unwrap();
    let addr = spawn_live_app(create_router(state)).await;
    let client = reqwest::Client::new();

    let health: Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let invalidated: Value = client
        .post(format!("http://{addr}/invalidate"))
        .json(&json!({"prefix": "product:"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(invalidated["removed"], 1);

    let stats: Value = client
        .get(format!("http://{addr}/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["entries"], 0);
}
