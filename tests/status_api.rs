//! Health and status endpoint integration tests.

mod common;

use common::*;
use serde_json::Value;

#[tokio::test]
async fn test_health_check_returns_healthy() {
    let (server, _pool) = build_test_app().await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_liveness_check_returns_ok() {
    let (server, _pool) = build_test_app().await;

    server.get("/health/live").await.assert_status_ok();
}

#[tokio::test]
async fn test_readiness_check_reports_database() {
    let (server, _pool) = build_test_app().await;

    let response = server.get("/health/ready").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ready"], true);
    assert_eq!(body["checks"][0]["name"], "database");
    assert_eq!(body["checks"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_fails_when_database_is_closed() {
    let (server, pool) = build_test_app().await;
    pool.close().await;

    let response = server.get("/health/ready").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["ready"], false);
    assert_eq!(body["checks"][0]["status"], "unhealthy");
    assert!(body["checks"][0]["message"].is_string());
}

#[tokio::test]
async fn test_status_counts_only_live_rows() {
    let (server, pool) = build_test_app().await;
    let parent = parent_folder(&pool).await;
    create_deleted_folder(&pool, "gone", None).await;
    create_document(&pool, "doc1", "", &parent).await;
    create_deleted_document(&pool, "byebye", &parent).await;
    create_topic(&pool, "first topic").await;

    let response = server.get("/status").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["counts"]["folders"], 1);
    assert_eq!(body["counts"]["documents"], 1);
    assert_eq!(body["counts"]["topics"], 1);
    assert!(body["database"]["max_connections"].is_number());
    assert!(body["uptime_seconds"].is_number());
}
