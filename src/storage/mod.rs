pub mod postgres;
pub mod sqlite;
pub mod timeout;
pub mod trait_def;

pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use timeout::TimeoutStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Connect to the configured backend
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.url);
            Arc::new(
                SqliteStorage::new(&config.url, config.max_connections)
                    .await
                    .context("failed to open SQLite database")?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage: {}", config.url);
            Arc::new(
                PostgresStorage::new(&config.url, config.max_connections)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            )
        }
    };

    Ok(storage)
}
