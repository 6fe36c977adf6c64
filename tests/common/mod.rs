//! Common test utilities and fixtures.

#![allow(dead_code)]

use axum_test::TestServer;
use docmngr::api;
use docmngr::db::{
    self, CreateDocument, CreateFolder, DbPool, Document, Folder, PoolConfig, Topic,
};
use docmngr::AppState;

/// Request body cap used by the test router.
pub const TEST_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Create a test database with the schema applied.
pub async fn setup_test_db() -> DbPool {
    let pool = db::create_pool_with_config(":memory:", PoolConfig::test())
        .await
        .expect("Failed to create test database");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    pool
}

/// Build a test server over the full application router.
pub async fn build_test_app() -> (TestServer, DbPool) {
    build_test_app_with_body_limit(TEST_MAX_BODY_BYTES).await
}

/// Same as [`build_test_app`] with a custom request body cap.
pub async fn build_test_app_with_body_limit(max_body_bytes: usize) -> (TestServer, DbPool) {
    let pool = setup_test_db().await;
    let app = api::app(AppState::from_pool(pool.clone()), max_body_bytes);
    let server = TestServer::new(app).expect("Failed to create test server");
    (server, pool)
}

// ============================================================================
// Fixtures
// ============================================================================

pub async fn create_folder(pool: &DbPool, name: &str, parent: Option<i64>) -> Folder {
    db::create_folder(
        pool,
        CreateFolder {
            name: name.to_string(),
            parent_folder_id: parent,
        },
    )
    .await
    .expect("Failed to create folder")
}

pub async fn create_deleted_folder(pool: &DbPool, name: &str, parent: Option<i64>) -> Folder {
    let folder = create_folder(pool, name, parent).await;
    db::set_folder_deleted(pool, folder.id, true)
        .await
        .expect("Failed to delete folder");
    folder
}

/// Top-level folder named "top_1".
pub async fn parent_folder(pool: &DbPool) -> Folder {
    create_folder(pool, "top_1", None).await
}

/// Child of `parent` with a non-ASCII name.
pub async fn child_folder(pool: &DbPool, parent: &Folder) -> Folder {
    create_folder(pool, "child_1 ✓", Some(parent.id)).await
}

pub async fn create_document(pool: &DbPool, title: &str, content: &str, folder: &Folder) -> Document {
    db::create_document(
        pool,
        CreateDocument {
            title: title.to_string(),
            content: content.to_string(),
            folder_id: folder.id,
        },
    )
    .await
    .expect("Failed to create document")
}

pub async fn create_deleted_document(pool: &DbPool, title: &str, folder: &Folder) -> Document {
    let document = create_document(pool, title, "gone", folder).await;
    db::set_document_deleted(pool, document.id, true)
        .await
        .expect("Failed to delete document");
    document
}

pub async fn create_topic(pool: &DbPool, name: &str) -> Topic {
    db::create_topic(pool, name)
        .await
        .expect("Failed to create topic")
}

pub async fn tag(pool: &DbPool, document: &Document, topic: &Topic) {
    db::add_document_topic(pool, document.id, topic.id)
        .await
        .expect("Failed to tag document");
}
