//! Document wire model and request parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{read_reference, read_string, Mode, StringRule, ValidationErrors};
use super::{TopicResponse, NAME_MAX_LENGTH};
use crate::db::{Document, Topic};

/// Document as exposed over HTTP, with its topics nested in association order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub folder: i64,
    pub topics: Vec<TopicResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponse {
    pub fn new(document: Document, topics: Vec<Topic>) -> Self {
        DocumentResponse {
            id: document.id,
            title: document.title,
            content: document.content,
            folder: document.folder_id,
            topics: topics.into_iter().map(TopicResponse::from).collect(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Document fields read from a request body, before any storage checks.
///
/// `topics` is read-only here; associations change through their own endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder: Option<i64>,
}

impl DocumentInput {
    pub fn parse(body: &Map<String, Value>, mode: Mode, errors: &mut ValidationErrors) -> Self {
        DocumentInput {
            title: read_string(body, "title", StringRule::bounded(NAME_MAX_LENGTH), mode, errors),
            content: read_string(body, "content", StringRule::text(), mode, errors),
            folder: read_reference(body, "folder", false, mode, errors).id(),
        }
    }
}
