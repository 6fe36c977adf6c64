//! Folder API endpoints.
//!
//! Routes:
//! - GET /folders/ - Top-level folders
//! - POST /folders/ - Create a folder
//! - GET /folders/:pk/ - A folder followed by its immediate children
//! - PUT /folders/:pk/ - Rename and/or reparent a folder
//! - GET /folders/:pk/documents/ - Documents stored in a folder

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{Map, Value};

use super::documents::document_bodies;
use super::resource::{self, Resource};
use super::Pk;
use crate::{
    db::{self, CreateFolder, DbPool, Folder, UpdateFolder},
    error::{Error, Result},
    models::{DocumentResponse, FieldError, FolderInput, FolderResponse, Mode, ValidationErrors},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders/",
            get(list_top_level_folders).post(resource::create::<FolderResource>),
        )
        .route(
            "/folders/:pk/",
            get(get_folder).put(resource::update::<FolderResource>),
        )
        .route("/folders/:pk/documents/", get(list_folder_documents))
}

// ============================================================================
// Handlers
// ============================================================================

/// List the top of the hierarchy. Empty list when there are no folders.
async fn list_top_level_folders(
    State(state): State<AppState>,
) -> Result<Json<Vec<FolderResponse>>> {
    let folders = db::list_top_level_folders(&state.db).await?;
    Ok(Json(folders.into_iter().map(FolderResponse::from).collect()))
}

/// Get a folder along with its children, the folder itself first.
///
/// Meant for clients browsing the hierarchy from the top down.
async fn get_folder(
    State(state): State<AppState>,
    Pk(id): Pk<i64>,
) -> Result<Json<Vec<FolderResponse>>> {
    let folder = db::get_active_folder(&state.db, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Folder not found: {}", id)))?;
    let children = db::list_child_folders(&state.db, id).await?;

    let folders = std::iter::once(folder)
        .chain(children)
        .map(FolderResponse::from)
        .collect();
    Ok(Json(folders))
}

/// List the documents stored in a folder.
async fn list_folder_documents(
    State(state): State<AppState>,
    Pk(folder_id): Pk<i64>,
) -> Result<Json<Vec<DocumentResponse>>> {
    if db::get_active_folder(&state.db, folder_id).await?.is_none() {
        return Err(Error::NotFound(format!("Folder not found: {}", folder_id)));
    }

    let documents = db::list_documents_in_folder(&state.db, folder_id).await?;
    Ok(Json(document_bodies(&state.db, documents).await?))
}

// ============================================================================
// Resource
// ============================================================================

/// Folders through the generic create/update handlers.
pub struct FolderResource;

#[async_trait]
impl Resource for FolderResource {
    type Record = Folder;
    type Draft = CreateFolder;
    type Changes = UpdateFolder;
    type Body = FolderResponse;

    const NAME: &'static str = "folder";

    fn id(record: &Folder) -> i64 {
        record.id
    }

    async fn load_active(pool: &DbPool, id: i64) -> Result<Option<Folder>> {
        db::get_active_folder(pool, id).await
    }

    async fn validate_create(pool: &DbPool, body: &Map<String, Value>) -> Result<CreateFolder> {
        let mut errors = ValidationErrors::new();
        let input = FolderInput::parse(body, Mode::Full, &mut errors);
        check_references(pool, &input, None, &mut errors).await?;

        match (errors.is_empty(), input.name) {
            (true, Some(name)) => Ok(CreateFolder {
                name,
                parent_folder_id: input.parent_folder.id(),
            }),
            _ => Err(Error::Validation(errors)),
        }
    }

    async fn validate_update(
        pool: &DbPool,
        record: &Folder,
        body: &Map<String, Value>,
    ) -> Result<UpdateFolder> {
        let mut errors = ValidationErrors::new();
        let input = FolderInput::parse(body, Mode::Partial, &mut errors);
        check_references(pool, &input, Some(record.id), &mut errors).await?;

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(UpdateFolder {
            name: input.name,
            parent_folder_id: input.parent_folder.as_change(),
        })
    }

    async fn insert(pool: &DbPool, draft: CreateFolder) -> Result<Folder> {
        db::create_folder(pool, draft).await.map_err(name_conflict)
    }

    async fn apply(pool: &DbPool, record: Folder, changes: UpdateFolder) -> Result<Folder> {
        if changes.is_empty() {
            return Ok(record);
        }
        db::update_folder(pool, record.id, changes)
            .await
            .map_err(name_conflict)
    }

    async fn serialize(_pool: &DbPool, record: Folder) -> Result<FolderResponse> {
        Ok(FolderResponse::from(record))
    }
}

/// Storage-backed checks: unique name, an existing parent, and no cycles.
///
/// Names are unique across every folder, deleted ones included. A parent may
/// itself be soft-deleted, but never the folder or one of its descendants.
async fn check_references(
    pool: &DbPool,
    input: &FolderInput,
    current_id: Option<i64>,
    errors: &mut ValidationErrors,
) -> Result<()> {
    if let Some(name) = &input.name {
        if db::folder_name_taken(pool, name, current_id).await? {
            errors.add("name", FieldError::unique("folder", "name"));
        }
    }

    if let Some(parent_id) = input.parent_folder.id() {
        if !db::folder_exists(pool, parent_id).await? {
            errors.add("parent_folder", FieldError::does_not_exist(parent_id));
        } else if let Some(current_id) = current_id {
            if db::folder_in_subtree(pool, current_id, parent_id).await? {
                errors.add("parent_folder", FieldError::cyclic_parent());
            }
        }
    }

    Ok(())
}

/// A concurrent writer may claim the name between check and write.
fn name_conflict(err: Error) -> Error {
    if err.is_unique_violation() {
        Error::Validation(ValidationErrors::single(
            "name",
            FieldError::unique("folder", "name"),
        ))
    } else {
        err
    }
}
