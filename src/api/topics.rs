//! Topic API endpoints.
//!
//! Topics are read-only over HTTP; they are seeded administratively.
//!
//! Routes:
//! - GET /topics/ - All topics
//! - GET /topics/:pk/ - A single topic
//! - GET /topics/:pk/documents/ - Documents tagged with a topic

use axum::{extract::State, routing::get, Json, Router};

use super::documents::document_bodies;
use super::Pk;
use crate::{
    db,
    error::{Error, Result},
    models::{DocumentResponse, TopicResponse},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topics/", get(list_topics))
        .route("/topics/:pk/", get(get_topic))
        .route("/topics/:pk/documents/", get(list_topic_documents))
}

async fn list_topics(State(state): State<AppState>) -> Result<Json<Vec<TopicResponse>>> {
    let topics = db::list_topics(&state.db).await?;
    Ok(Json(topics.into_iter().map(TopicResponse::from).collect()))
}

async fn get_topic(
    State(state): State<AppState>,
    Pk(id): Pk<i64>,
) -> Result<Json<TopicResponse>> {
    let topic = db::get_topic(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Topic not found: {}", id)))?;

    Ok(Json(TopicResponse::from(topic)))
}

/// List the documents tagged with a topic, in the order they were tagged.
async fn list_topic_documents(
    State(state): State<AppState>,
    Pk(topic_id): Pk<i64>,
) -> Result<Json<Vec<DocumentResponse>>> {
    if db::get_topic(&state.db, topic_id).await?.is_none() {
        return Err(Error::NotFound(format!("Topic not found: {}", topic_id)));
    }

    let documents = db::list_documents_for_topic(&state.db, topic_id).await?;
    Ok(Json(document_bodies(&state.db, documents).await?))
}
