//! API Routes for the document manager
//!
//! This module combines all API routes into a single router.
//! Paths keep their trailing slash, as clients address them that way.

mod documents;
mod folders;
pub mod resource;
pub mod status;
mod topics;

pub use documents::DocumentResource;
pub use folders::FolderResource;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::Router;
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::AppState;

/// Build the complete API router.
///
/// Route structure:
/// - /folders/* - Folder hierarchy and per-folder document listing
/// - /documents/* - Documents and their topic associations
/// - /topics/* - Topics and per-topic document listing
/// - /health, /status - Health checks (public)
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .merge(folders::routes())
        .merge(documents::routes())
        .merge(topics::routes())
}

/// Routes with the HTTP middleware stack and state applied, ready to serve.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

/// Primary key(s) taken from the URL.
///
/// A segment that does not parse is treated like an unknown id: 404.
pub struct Pk<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Pk<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Pk(value)),
            Err(rejection) => Err(Error::NotFound(format!(
                "Unresolvable path {}: {}",
                parts.uri.path(),
                rejection.body_text()
            ))),
        }
    }
}
