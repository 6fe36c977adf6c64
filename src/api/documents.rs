//! Document API endpoints.
//!
//! Routes:
//! - POST /documents/ - Create a document
//! - GET /documents/:pk/ - Get a document with its topics
//! - PUT /documents/:pk/ - Edit or move a document
//! - POST /documents/:pk/topics/:topic_pk/ - Attach a topic
//! - DELETE /documents/:pk/topics/:topic_pk/ - Detach a topic

use async_trait::async_trait;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::resource::{self, Resource};
use super::Pk;
use crate::{
    db::{self, CreateDocument, DbPool, Document, UpdateDocument},
    error::{Error, Result},
    models::{DocumentInput, DocumentResponse, FieldError, Mode, ValidationErrors},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents/", post(resource::create::<DocumentResource>))
        .route(
            "/documents/:pk/",
            get(get_document).put(resource::update::<DocumentResource>),
        )
        .route(
            "/documents/:pk/topics/:topic_pk/",
            post(add_topic).delete(remove_topic),
        )
}

// ============================================================================
// Serialization helpers
// ============================================================================

/// Serialize a document together with its topics.
pub(crate) async fn document_body(pool: &DbPool, document: Document) -> Result<DocumentResponse> {
    let topics = db::list_document_topics(pool, document.id).await?;
    Ok(DocumentResponse::new(document, topics))
}

pub(crate) async fn document_bodies(
    pool: &DbPool,
    documents: Vec<Document>,
) -> Result<Vec<DocumentResponse>> {
    let mut bodies = Vec::with_capacity(documents.len());
    for document in documents {
        bodies.push(document_body(pool, document).await?);
    }
    Ok(bodies)
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_document(
    State(state): State<AppState>,
    Pk(id): Pk<i64>,
) -> Result<Json<DocumentResponse>> {
    let document = db::get_active_document(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Document not found: {}", id)))?;

    Ok(Json(document_body(&state.db, document).await?))
}

/// Attach a topic to a document.
///
/// Attaching twice, or attaching an unknown topic id, leaves the document
/// unchanged and still answers 200.
async fn add_topic(
    State(state): State<AppState>,
    Pk((document_id, topic_id)): Pk<(i64, i64)>,
) -> Result<Json<DocumentResponse>> {
    let document = find_document(&state.db, document_id).await?;

    if db::add_document_topic(&state.db, document_id, topic_id).await? {
        info!(document_id, topic_id, "Attached topic to document");
    } else {
        debug!(document_id, topic_id, "Topic not attached (already present or unknown)");
    }

    Ok(Json(document_body(&state.db, document).await?))
}

/// Detach a topic from a document. Detaching an absent topic is a no-op.
async fn remove_topic(
    State(state): State<AppState>,
    Pk((document_id, topic_id)): Pk<(i64, i64)>,
) -> Result<Json<DocumentResponse>> {
    let document = find_document(&state.db, document_id).await?;

    if db::remove_document_topic(&state.db, document_id, topic_id).await? {
        info!(document_id, topic_id, "Detached topic from document");
    }

    Ok(Json(document_body(&state.db, document).await?))
}

/// Association endpoints resolve the document without the soft-delete filter.
async fn find_document(pool: &DbPool, id: i64) -> Result<Document> {
    db::get_document(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Document not found: {}", id)))
}

// ============================================================================
// Resource
// ============================================================================

/// Documents through the generic create/update handlers.
pub struct DocumentResource;

#[async_trait]
impl Resource for DocumentResource {
    type Record = Document;
    type Draft = CreateDocument;
    type Changes = UpdateDocument;
    type Body = DocumentResponse;

    const NAME: &'static str = "document";

    fn id(record: &Document) -> i64 {
        record.id
    }

    async fn load_active(pool: &DbPool, id: i64) -> Result<Option<Document>> {
        db::get_active_document(pool, id).await
    }

    async fn validate_create(pool: &DbPool, body: &Map<String, Value>) -> Result<CreateDocument> {
        let mut errors = ValidationErrors::new();
        let input = DocumentInput::parse(body, Mode::Full, &mut errors);
        check_folder(pool, input.folder, &mut errors).await?;

        match (errors.is_empty(), input) {
            (
                true,
                DocumentInput {
                    title: Some(title),
                    content: Some(content),
                    folder: Some(folder_id),
                },
            ) => Ok(CreateDocument {
                title,
                content,
                folder_id,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    async fn validate_update(
        pool: &DbPool,
        _record: &Document,
        body: &Map<String, Value>,
    ) -> Result<UpdateDocument> {
        let mut errors = ValidationErrors::new();
        let input = DocumentInput::parse(body, Mode::Partial, &mut errors);
        check_folder(pool, input.folder, &mut errors).await?;

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(UpdateDocument {
            title: input.title,
            content: input.content,
            folder_id: input.folder,
        })
    }

    async fn insert(pool: &DbPool, draft: CreateDocument) -> Result<Document> {
        db::create_document(pool, draft).await
    }

    async fn apply(pool: &DbPool, record: Document, changes: UpdateDocument) -> Result<Document> {
        if changes.is_empty() {
            return Ok(record);
        }
        db::update_document(pool, record.id, changes).await
    }

    async fn serialize(pool: &DbPool, record: Document) -> Result<DocumentResponse> {
        document_body(pool, record).await
    }
}

/// The target folder must exist; it may be soft-deleted.
async fn check_folder(
    pool: &DbPool,
    folder_id: Option<i64>,
    errors: &mut ValidationErrors,
) -> Result<()> {
    if let Some(folder_id) = folder_id {
        if !db::folder_exists(pool, folder_id).await? {
            errors.add("folder", FieldError::does_not_exist(folder_id));
        }
    }
    Ok(())
}
