//! Database layer for the document manager.
//!
//! Provides SQLite connection pooling and query modules
//! for folders, documents and topics.

mod documents;
mod folders;
mod pool;
mod topics;

pub use documents::*;
pub use folders::*;
pub use pool::*;
pub use topics::*;

use crate::config::DatabaseConfig;
use crate::Result;
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

/// Predicate that hides soft-deleted rows, qualified by a table alias.
///
/// Every soft-delete-aware read goes through this so the rule lives in one place.
pub(crate) fn active_only(alias: &str) -> String {
    format!("{}.is_deleted = 0", alias)
}

/// Initialize the database connection pool from the `DATABASE_*` settings.
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = create_pool_with_config(&config.path, PoolConfig::from_config(config)).await?;
    info!("Database pool initialized: {}", config.path);
    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    for statement in schema_statements(schema) {
        sqlx::query(&statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}

/// Split a SQL script into statements.
///
/// Comment lines are dropped before splitting on `;`, so comments may
/// contain any text.
fn schema_statements(script: &str) -> Vec<String> {
    let sql: String = script
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    sql.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

/// In-memory pool with the schema applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = create_pool_with_config(":memory:", PoolConfig::test())
        .await
        .unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}
