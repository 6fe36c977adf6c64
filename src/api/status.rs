//! Status Routes
//!
//! Health checks and status endpoints.
//!
//! Routes:
//! - GET /health - Basic health check
//! - GET /health/ready - Readiness check (database answering)
//! - GET /health/live - Liveness check (server responding)
//! - GET /status - Detailed system status

use std::sync::OnceLock;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{self, PoolStats};
use crate::{AppState, Result};

static STARTUP_TIME: OnceLock<Instant> = OnceLock::new();

/// Initialize startup time. Call this once at server start.
pub fn init_startup_time() {
    let _ = STARTUP_TIME.get_or_init(Instant::now);
}

/// Get uptime in seconds since server start.
fn get_uptime_seconds() -> u64 {
    STARTUP_TIME.get().map(|start| start.elapsed().as_secs()).unwrap_or(0)
}

/// Build status routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .route("/status", get(system_status))
}

// ============================================================================
// Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<DependencyCheck>,
}

#[derive(Debug, Serialize)]
pub struct DependencyCheck {
    pub name: String,
    pub status: HealthStatus,
    pub latency_ms: Option<u64>,
    pub message: Option<String>,
}

/// System status response.
#[derive(Debug, Serialize)]
pub struct SystemStatusResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: PoolStats,
    pub counts: RecordCounts,
}

/// Live rows per table. Soft-deleted rows are not counted.
#[derive(Debug, Serialize)]
pub struct RecordCounts {
    pub folders: i64,
    pub documents: i64,
    pub topics: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Basic health check.
///
/// GET /health
///
/// Returns 200 if the server is running.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").into(),
        timestamp: Utc::now(),
    })
}

/// Readiness check.
///
/// GET /health/ready
///
/// Returns 503 when the database does not answer.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_check = check_database(&state).await;
    let ready = db_check.status == HealthStatus::Healthy;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            checks: vec![db_check],
        }),
    )
}

/// Liveness check.
///
/// GET /health/live
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Detailed system status.
///
/// GET /status
async fn system_status(State(state): State<AppState>) -> Result<Json<SystemStatusResponse>> {
    let counts = RecordCounts {
        folders: db::count_active_folders(&state.db).await?,
        documents: db::count_active_documents(&state.db).await?,
        topics: db::count_topics(&state.db).await?,
    };

    Ok(Json(SystemStatusResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: get_uptime_seconds(),
        database: db::get_pool_stats(&state.db),
        counts,
    }))
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn check_database(state: &AppState) -> DependencyCheck {
    let start = Instant::now();
    let result = db::health_check(&state.db).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(()) => (HealthStatus::Healthy, None),
        Err(e) => (HealthStatus::Unhealthy, Some(format!("Database error: {}", e))),
    };

    DependencyCheck {
        name: "database".into(),
        status,
        latency_ms: Some(latency_ms),
        message,
    }
}
