//! Generic create/update handlers.
//!
//! Each entity supplies its capability set through the [`Resource`] trait:
//! how to validate a body, find an active record, persist, and serialize.
//! The handlers here own the HTTP contract shared by all of them.
//!
//! - create: 201 + body, or 400 + field errors
//! - update: 404 if missing or soft-deleted, 400 + field errors, or 200 + body

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use super::Pk;
use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::models::expect_object;
use crate::AppState;

/// An entity managed through the generic create/update handlers.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Stored record.
    type Record: Send + Sync + 'static;
    /// Validated input for a new record.
    type Draft: Send + 'static;
    /// Validated partial update.
    type Changes: Send + 'static;
    /// Wire representation.
    type Body: Serialize + Send + 'static;

    /// Singular name used in logs and not-found messages.
    const NAME: &'static str;

    fn id(record: &Self::Record) -> i64;

    /// Find a record that is not soft-deleted.
    async fn load_active(pool: &DbPool, id: i64) -> Result<Option<Self::Record>>;

    /// Check a complete body. Fails with [`Error::Validation`] listing every bad field.
    async fn validate_create(pool: &DbPool, body: &Map<String, Value>) -> Result<Self::Draft>;

    /// Check the fields present in a partial body.
    async fn validate_update(
        pool: &DbPool,
        record: &Self::Record,
        body: &Map<String, Value>,
    ) -> Result<Self::Changes>;

    async fn insert(pool: &DbPool, draft: Self::Draft) -> Result<Self::Record>;

    async fn apply(
        pool: &DbPool,
        record: Self::Record,
        changes: Self::Changes,
    ) -> Result<Self::Record>;

    async fn serialize(pool: &DbPool, record: Self::Record) -> Result<Self::Body>;
}

/// `POST` handler for any [`Resource`].
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<R::Body>)> {
    let Json(body) = payload?;
    let body = expect_object(&body)?;

    let draft = R::validate_create(&state.db, body).await?;
    let record = R::insert(&state.db, draft).await?;
    info!(id = R::id(&record), "Created {}", R::NAME);

    let body = R::serialize(&state.db, record).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// `PUT` handler for any [`Resource`]. Only the supplied fields change.
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Pk(id): Pk<i64>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<R::Body>> {
    // Missing records win over malformed bodies.
    let record = R::load_active(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("{} not found: {}", R::NAME, id)))?;

    let Json(body) = payload?;
    let body = expect_object(&body)?;

    let changes = R::validate_update(&state.db, &record, body).await?;
    let record = R::apply(&state.db, record, changes).await?;
    info!(id, "Updated {}", R::NAME);

    let body = R::serialize(&state.db, record).await?;
    Ok(Json(body))
}
