//! Topic and document/topic association queries.
//!
//! Topics have no soft-delete flag. Associations keep their insertion order
//! through the join table's own id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;
use crate::{Error, Result};

/// Topic record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create a topic. Administrative; topics are seeded outside the HTTP API.
pub async fn create_topic(pool: &DbPool, name: &str) -> Result<Topic> {
    let now = Utc::now();

    let topic = sqlx::query_as::<_, Topic>(
        r#"
        INSERT INTO topics (name, created_at, updated_at)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(topic)
}

/// Get a topic by ID.
pub async fn get_topic(pool: &DbPool, id: i64) -> Result<Option<Topic>> {
    sqlx::query_as::<_, Topic>("SELECT * FROM topics WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// List all topics in insertion order.
pub async fn list_topics(pool: &DbPool) -> Result<Vec<Topic>> {
    sqlx::query_as::<_, Topic>("SELECT * FROM topics ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// List the topics attached to a document, in the order they were attached.
pub async fn list_document_topics(pool: &DbPool, document_id: i64) -> Result<Vec<Topic>> {
    sqlx::query_as::<_, Topic>(
        r#"
        SELECT t.* FROM topics t
        INNER JOIN document_topics dt ON dt.topic_id = t.id
        WHERE dt.document_id = ?
        ORDER BY dt.id
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Attach a topic to a document.
///
/// Returns `false` when nothing changed: the pair is already associated or
/// the topic does not exist.
pub async fn add_document_topic(pool: &DbPool, document_id: i64, topic_id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO document_topics (document_id, topic_id)
        SELECT ?, t.id FROM topics t WHERE t.id = ?
        ON CONFLICT (document_id, topic_id) DO NOTHING
        "#,
    )
    .bind(document_id)
    .bind(topic_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Detach a topic from a document. Returns `false` if they were not associated.
pub async fn remove_document_topic(
    pool: &DbPool,
    document_id: i64,
    topic_id: i64,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM document_topics WHERE document_id = ? AND topic_id = ?")
        .bind(document_id)
        .bind(topic_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count all topics.
pub async fn count_topics(pool: &DbPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topics")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
