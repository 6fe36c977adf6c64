//! Application state for the document manager.
//!
//! Contains the shared state that is passed to all handlers.

use crate::db::{self, DbPool};
use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
}

impl AppState {
    /// Open the configured database and bring its schema up to date.
    pub async fn new() -> Result<Self> {
        let config = config();

        let db = db::init_pool(&config.database).await?;
        db::initialize_schema(&db).await?;

        Ok(Self::from_pool(db))
    }

    /// Wrap an already prepared pool.
    pub fn from_pool(db: DbPool) -> Self {
        Self { db }
    }
}
