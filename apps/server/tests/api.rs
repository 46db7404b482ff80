//! Router-level tests for the request paths that never leave the process:
//! liveness, request validation, and device-header enforcement. Anything
//! that would dial an upstream is covered by unit tests with scripted
//! providers in the core crates.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use tempfile::tempdir;
use tower::ServiceExt;

use clearcost_server::{api::app_router, build_state, config::Config};

async fn build_test_router() -> (axum::Router, tempfile::TempDir) {
    let tmp = tempdir().unwrap();
    std::env::set_var("CLEARCOST_DB_PATH", tmp.path().join("test.db"));

    let config = Config::from_env();
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn invalid_calculation_is_rejected_before_any_upstream_call() {
    let (app, _tmp) = build_test_router().await;

    // Year below the Euro-2 floor.
    let payload = serde_json::json!({
        "brandId": 79,
        "modelId": 2104,
        "year": 1990,
        "fuelType": "petrol",
        "engineCapacity": 1998,
        "priceEur": 15000
    });

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/calculator/calculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION");
    assert!(body["message"].as_str().unwrap().contains("year"));
}

#[tokio::test]
async fn history_requires_a_device_header() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("X-Device-Id"));
}

#[tokio::test]
async fn history_of_an_unknown_device_is_empty() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/history")
                .header("X-Device-Id", "fresh-device")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn deleting_a_missing_history_record_is_404() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/history/123456")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn seeded_brand_dictionary_is_served() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/brands")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let brands = body.as_array().unwrap();
    assert!(!brands.is_empty(), "seeding should populate the dictionary");
    assert!(brands[0]["id"].is_number());
    assert!(brands[0]["name"].is_string());
}
