//! SQLite connection pool setup.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use super::DbPool;
use crate::config::DatabaseConfig;
use crate::Result;

/// Path that selects a private in-memory database.
const IN_MEMORY: &str = ":memory:";

/// Pool sizing and lock waits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request waits for a free connection.
    pub acquire_timeout: Duration,
    /// How long SQLite waits on a locked database before failing a statement.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Configure from the `DATABASE_*` settings.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections.max(1),
            ..Default::default()
        }
    }

    /// A single connection with short waits, for in-memory test databases.
    pub fn test() -> Self {
        Self {
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(1),
        }
    }
}

/// Open a pool on `path`, creating the file and its directory if needed.
pub async fn create_pool_with_config(path: &str, config: PoolConfig) -> Result<DbPool> {
    let in_memory = path == IN_MEMORY;

    if !in_memory {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(path)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout)
        // Cascading deletes depend on this
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout);

    // An in-memory database lives only as long as its connections.
    if in_memory {
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    Ok(pool_options.connect_with(options).await?)
}

/// Health check for the database connection.
pub async fn health_check(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Connection counts reported by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_connections: u32,
}

pub fn get_pool_stats(pool: &DbPool) -> PoolStats {
    PoolStats {
        size: pool.size(),
        idle: pool.num_idle() as u32,
        max_connections: pool.options().get_max_connections(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let pool = create_pool_with_config(IN_MEMORY, PoolConfig::test()).await.unwrap();
        health_check(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_pool_stats() {
        let pool = create_pool_with_config(IN_MEMORY, PoolConfig::test()).await.unwrap();
        let stats = get_pool_stats(&pool);
        assert_eq!(stats.max_connections, 1);
        assert!(stats.size <= 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_pool_with_config(IN_MEMORY, PoolConfig::test()).await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_pool_config_from_database_config() {
        let config = PoolConfig::from_config(&DatabaseConfig {
            path: IN_MEMORY.to_string(),
            max_connections: 0,
        });
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.min_connections, 1);
    }
}
