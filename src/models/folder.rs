//! Folder wire model and request parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::validation::{read_reference, read_string, Mode, Reference, StringRule, ValidationErrors};
use super::NAME_MAX_LENGTH;
use crate::db::Folder;

/// Folder as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub parent_folder: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        FolderResponse {
            id: folder.id,
            name: folder.name,
            parent_folder: folder.parent_folder_id,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

/// Folder fields read from a request body, before any storage checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInput {
    pub name: Option<String>,
    pub parent_folder: Reference,
}

impl FolderInput {
    pub fn parse(body: &Map<String, Value>, mode: Mode, errors: &mut ValidationErrors) -> Self {
        FolderInput {
            name: read_string(body, "name", StringRule::bounded(NAME_MAX_LENGTH), mode, errors),
            parent_folder: read_reference(body, "parent_folder", true, mode, errors),
        }
    }
}
