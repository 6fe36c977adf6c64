//! Document database queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{active_only, DbPool};
use crate::{Error, Result};

/// Document record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub folder_id: i64,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new document.
#[derive(Debug, Clone)]
pub struct CreateDocument {
    pub title: String,
    pub content: String,
    pub folder_id: i64,
}

/// Input for updating a document. Omitted fields keep their values.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocument {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<i64>,
}

impl UpdateDocument {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.folder_id.is_none()
    }
}

/// Create a new document.
pub async fn create_document(pool: &DbPool, input: CreateDocument) -> Result<Document> {
    let now = Utc::now();

    let document = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (title, content, folder_id, is_deleted, created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.folder_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(document)
}

/// Get a document by ID regardless of its soft-delete flag.
pub async fn get_document(pool: &DbPool, id: i64) -> Result<Option<Document>> {
    sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Get a non-deleted document by ID.
pub async fn get_active_document(pool: &DbPool, id: i64) -> Result<Option<Document>> {
    let query = format!(
        "SELECT d.* FROM documents d WHERE d.id = ? AND {}",
        active_only("d")
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Update a document's title, content and/or folder.
pub async fn update_document(pool: &DbPool, id: i64, input: UpdateDocument) -> Result<Document> {
    sqlx::query_as::<_, Document>(
        r#"
        UPDATE documents SET
            title = COALESCE(?, title),
            content = COALESCE(?, content),
            folder_id = COALESCE(?, folder_id),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(input.title)
    .bind(input.content)
    .bind(input.folder_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Document not found: {}", id)))
}

/// List the non-deleted documents stored in a folder.
pub async fn list_documents_in_folder(pool: &DbPool, folder_id: i64) -> Result<Vec<Document>> {
    let query = format!(
        "SELECT d.* FROM documents d WHERE d.folder_id = ? AND {} ORDER BY d.id",
        active_only("d")
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(folder_id)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// List the non-deleted documents tagged with a topic, in association order.
pub async fn list_documents_for_topic(pool: &DbPool, topic_id: i64) -> Result<Vec<Document>> {
    let query = format!(
        r#"
        SELECT d.* FROM documents d
        INNER JOIN document_topics dt ON dt.document_id = d.id
        WHERE dt.topic_id = ? AND {}
        ORDER BY dt.id
        "#,
        active_only("d")
    );

    sqlx::query_as::<_, Document>(&query)
        .bind(topic_id)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

/// Set or clear the soft-delete flag. Administrative; not exposed over HTTP.
pub async fn set_document_deleted(pool: &DbPool, id: i64, deleted: bool) -> Result<()> {
    let result = sqlx::query("UPDATE documents SET is_deleted = ?, updated_at = ? WHERE id = ?")
        .bind(deleted)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Document not found: {}", id)));
    }

    Ok(())
}

/// Count non-deleted documents.
pub async fn count_active_documents(pool: &DbPool) -> Result<i64> {
    let query = format!("SELECT COUNT(*) FROM documents d WHERE {}", active_only("d"));
    let (count,): (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_folder, create_topic, purge_folder, test_pool, CreateFolder};

    async fn setup() -> (DbPool, i64) {
        let pool = test_pool().await;
        let folder = create_folder(
            &pool,
            CreateFolder {
                name: "top_1".to_string(),
                parent_folder_id: None,
            },
        )
        .await
        .unwrap();
        (pool, folder.id)
    }

    async fn document(pool: &DbPool, title: &str, folder_id: i64) -> Document {
        create_document(
            pool,
            CreateDocument {
                title: title.to_string(),
                content: "quick brown dog".to_string(),
                folder_id,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_document() {
        let (pool, folder_id) = setup().await;
        let created = document(&pool, "doc1", folder_id).await;

        let fetched = get_active_document(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "doc1");
        assert_eq!(fetched.content, "quick brown dog");
        assert_eq!(fetched.folder_id, folder_id);
    }

    #[tokio::test]
    async fn test_deleted_document_only_visible_unfiltered() {
        let (pool, folder_id) = setup().await;
        let created = document(&pool, "byebye", folder_id).await;
        set_document_deleted(&pool, created.id, true).await.unwrap();

        assert!(get_active_document(&pool, created.id).await.unwrap().is_none());
        assert!(get_document(&pool, created.id).await.unwrap().is_some());
        assert!(list_documents_in_folder(&pool, folder_id).await.unwrap().is_empty());
        assert_eq!(count_active_documents(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_move_document_keeps_other_fields() {
        let (pool, folder_id) = setup().await;
        let other = create_folder(
            &pool,
            CreateFolder {
                name: "child_1".to_string(),
                parent_folder_id: Some(folder_id),
            },
        )
        .await
        .unwrap();
        let created = document(&pool, "doc1", folder_id).await;

        let moved = update_document(
            &pool,
            created.id,
            UpdateDocument {
                folder_id: Some(other.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(moved.folder_id, other.id);
        assert_eq!(moved.title, "doc1");
        assert_eq!(moved.content, "quick brown dog");
    }

    #[tokio::test]
    async fn test_list_documents_for_topic_in_association_order() {
        let (pool, folder_id) = setup().await;
        let first = document(&pool, "first", folder_id).await;
        let second = document(&pool, "second", folder_id).await;
        let topic = create_topic(&pool, "first topic").await.unwrap();

        crate::db::add_document_topic(&pool, second.id, topic.id).await.unwrap();
        crate::db::add_document_topic(&pool, first.id, topic.id).await.unwrap();

        let ids: Vec<i64> = list_documents_for_topic(&pool, topic.id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_purging_folder_removes_documents() {
        let (pool, folder_id) = setup().await;
        let created = document(&pool, "doc1", folder_id).await;

        purge_folder(&pool, folder_id).await.unwrap();

        assert!(get_document(&pool, created.id).await.unwrap().is_none());
    }
}
