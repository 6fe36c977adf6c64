//! Folder database queries.
//!
//! Folders form a tree through `parent_folder_id`. A folder is never removed
//! by the API: `is_deleted` hides it from every read that goes through
//! [`active_only`](super::active_only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{active_only, DbPool};
use crate::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Folder record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub name: String,
    pub parent_folder_id: Option<i64>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new folder.
#[derive(Debug, Clone)]
pub struct CreateFolder {
    pub name: String,
    pub parent_folder_id: Option<i64>,
}

/// Input for updating a folder. `None` leaves the column untouched;
/// `parent_folder_id: Some(None)` moves the folder to the top level.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolder {
    pub name: Option<String>,
    pub parent_folder_id: Option<Option<i64>>,
}

impl UpdateFolder {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_folder_id.is_none()
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new folder.
pub async fn create_folder(pool: &DbPool, input: CreateFolder) -> Result<Folder> {
    let now = Utc::now();

    let folder = sqlx::query_as::<_, Folder>(
        r#"
        INSERT INTO folders (name, parent_folder_id, is_deleted, created_at, updated_at)
        VALUES (?, ?, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(input.parent_folder_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(folder)
}

/// Get a non-deleted folder by ID.
pub async fn get_active_folder(pool: &DbPool, id: i64) -> Result<Option<Folder>> {
    let query = format!(
        "SELECT f.* FROM folders f WHERE f.id = ? AND {}",
        active_only("f")
    );

    sqlx::query_as::<_, Folder>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Check whether a folder row exists, deleted or not.
pub async fn folder_exists(pool: &DbPool, id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM folders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Check whether a folder name is used by any folder other than `exclude_id`.
///
/// Deleted folders still hold their names.
pub async fn folder_name_taken(pool: &DbPool, name: &str, exclude_id: Option<i64>) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM folders WHERE name = ? AND (? IS NULL OR id != ?) LIMIT 1",
    )
    .bind(name)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// Check whether `candidate_id` is `root_id` or sits anywhere below it.
///
/// Walks deleted folders too. `UNION` stops the walk on rows that already
/// form a loop.
pub async fn folder_in_subtree(pool: &DbPool, root_id: i64, candidate_id: i64) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT ?
            UNION
            SELECT f.id FROM folders f INNER JOIN subtree s ON f.parent_folder_id = s.id
        )
        SELECT id FROM subtree WHERE id = ? LIMIT 1
        "#,
    )
    .bind(root_id)
    .bind(candidate_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

/// List non-deleted folders without a parent.
pub async fn list_top_level_folders(pool: &DbPool) -> Result<Vec<Folder>> {
    let query = format!(
        "SELECT f.* FROM folders f WHERE f.parent_folder_id IS NULL AND {} ORDER BY f.id",
        active_only("f")
    );

    sqlx::query_as::<_, Folder>(&query)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// List the non-deleted immediate children of a folder, never the folder itself.
pub async fn list_child_folders(pool: &DbPool, parent_id: i64) -> Result<Vec<Folder>> {
    let query = format!(
        "SELECT f.* FROM folders f WHERE f.parent_folder_id = ? AND f.id != ? AND {} ORDER BY f.id",
        active_only("f")
    );

    sqlx::query_as::<_, Folder>(&query)
        .bind(parent_id)
        .bind(parent_id)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// Update a folder's name and/or parent.
pub async fn update_folder(pool: &DbPool, id: i64, input: UpdateFolder) -> Result<Folder> {
    let reparent = input.parent_folder_id.is_some();
    let parent = input.parent_folder_id.flatten();

    sqlx::query_as::<_, Folder>(
        r#"
        UPDATE folders SET
            name = COALESCE(?, name),
            parent_folder_id = CASE WHEN ? THEN ? ELSE parent_folder_id END,
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(input.name)
    .bind(reparent)
    .bind(parent)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Folder not found: {}", id)))
}

/// Set or clear the soft-delete flag. Administrative; not exposed over HTTP.
pub async fn set_folder_deleted(pool: &DbPool, id: i64, deleted: bool) -> Result<()> {
    let result = sqlx::query("UPDATE folders SET is_deleted = ?, updated_at = ? WHERE id = ?")
        .bind(deleted)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Folder not found: {}", id)));
    }

    Ok(())
}

/// Physically remove a folder. Descendant folders, their documents and
/// topic associations go with it through the schema's cascades.
pub async fn purge_folder(pool: &DbPool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM folders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Folder not found: {}", id)));
    }

    Ok(())
}

/// Count non-deleted folders.
pub async fn count_active_folders(pool: &DbPool) -> Result<i64> {
    let query = format!("SELECT COUNT(*) FROM folders f WHERE {}", active_only("f"));
    let (count,): (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
    Ok(count)
}
