/*!
 * HTTP Handler Tests
 * Status-code mapping and response bodies through the router
 */

use crate::common::{harness, Harness};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pressure_sim::api::{router, AppState};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

async fn call(h: &Harness, method: Method, uri: &str) -> (StatusCode, Value) {
    let app = router(AppState::with_hostname(h.simulator.clone(), "test-pod"));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_index_reports_service_info() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::GET, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app"], "Memory Resource Limiter");
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["hostname"], "test-pod");
    assert_eq!(body["allocated_blocks"], 0);
    assert!(body["endpoints"]["GET /health"].is_string());
}

#[tokio::test]
async fn test_allocate_defaults_to_ten_mb() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::POST, "/allocate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["allocated_mb"], 10);
    assert_eq!(body["allocated_blocks"], 1);
    assert_eq!(body["ledger_mb"], 10);
}

#[tokio::test]
async fn test_allocate_over_cap_is_bad_request() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::POST, "/allocate?mb=900").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "request_too_large");
    assert_eq!(body["request_mb"], 900);
    assert_eq!(h.simulator.block_count(), 0);
}

#[tokio::test]
async fn test_host_failure_is_server_error() {
    let h = harness(230.0, 5, 800);
    h.allocator.set_failing(true);
    let (status, body) = call(&h, Method::POST, "/allocate?mb=20").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "allocation_failed");
    assert_eq!(h.simulator.consecutive_failures(), 1);
}

#[tokio::test]
async fn test_malformed_size_gets_json_error() {
    let h = harness(230.0, 5, 800);

    for (method, uri) in [
        (Method::POST, "/allocate?mb=lots"),
        (Method::POST, "/allocate?mb=-5"),
        (Method::POST, "/deallocate?mb=2.5"),
    ] {
        let (status, body) = call(&h, method, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "invalid_size");
        assert!(body["message"].is_string());
        assert!(body.get("request_mb").is_none());
    }

    assert_eq!(h.simulator.block_count(), 0);
    assert_eq!(h.simulator.consecutive_failures(), 0);
}

#[tokio::test]
async fn test_zero_size_rejected() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::POST, "/allocate?mb=0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_size");
    assert_eq!(body["request_mb"], 0);
}

#[tokio::test]
async fn test_deallocate_empty_is_bad_request() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::POST, "/deallocate?mb=5").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "nothing_allocated");
    assert_eq!(body["message"], "No allocated memory to deallocate");
}

#[tokio::test]
async fn test_allocate_then_deallocate() {
    let h = harness(230.0, 5, 800);
    call(&h, Method::POST, "/allocate?mb=10").await;
    call(&h, Method::POST, "/allocate?mb=5").await;

    let (status, body) = call(&h, Method::POST, "/deallocate?mb=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deallocated_mb"], 5);
    assert_eq!(body["allocated_blocks"], 1);
    assert_eq!(body["ledger_mb"], 10);

    let (_, memory) = call(&h, Method::GET, "/memory").await;
    assert_eq!(memory["allocated_blocks"], 1);
    assert_eq!(memory["allocated_mb"], 10);
    assert_eq!(memory["memory"]["resident_mb"], 100.0);
}

#[tokio::test]
async fn test_health_maps_to_status_codes() {
    let h = harness(230.0, 5, 800);
    let (status, body) = call(&h, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("reason").is_none());

    h.source.set(250);
    let (status, body) = call(&h, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(
        body["reason"],
        "resident memory 250.00 MB exceeds threshold 230.00 MB"
    );
}
