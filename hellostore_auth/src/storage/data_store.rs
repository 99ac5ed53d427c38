use std::str::FromStr;
use std::sync::Arc;

use sqlx::{Pool, Postgres, Sqlite};

use crate::storage::errors::StorageError;

// Types
#[derive(Clone, Debug)]
pub(crate) struct SqliteDataStore {
    pub(super) pool: sqlx::SqlitePool,
}

#[derive(Clone, Debug)]
pub(crate) struct PostgresDataStore {
    pub(super) pool: sqlx::PgPool,
}

// Trait
pub trait DataStore: Send + Sync {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>>;
    fn as_postgres(&self) -> Option<&Pool<Postgres>>;
}

/// Shared handle to the relational store backing the credential records.
pub type SharedDataStore = Arc<dyn DataStore>;

impl DataStore for SqliteDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        Some(&self.pool)
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        None
    }
}

impl DataStore for PostgresDataStore {
    fn as_sqlite(&self) -> Option<&Pool<Sqlite>> {
        None
    }

    fn as_postgres(&self) -> Option<&Pool<Postgres>> {
        Some(&self.pool)
    }
}

/// Build a data store from configuration.
///
/// Supported kinds are "sqlite" and "postgres". Connections are created
/// lazily; the first query opens them.
pub fn build_data_store(kind: &str, url: &str) -> Result<SharedDataStore, StorageError> {
    tracing::info!("Initializing data store with type: {}, url: {}", kind, url);

    let store: SharedDataStore = match kind {
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(url)
                .map_err(|e| StorageError::Storage(format!("Invalid SQLite URL: {e}")))?
                .create_if_missing(true);

            // An in-memory SQLite database exists per connection, so the pool
            // must be pinned to a single connection to see one database.
            let pool_opts = if url.contains(":memory:") {
                sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                sqlx::sqlite::SqlitePoolOptions::new()
            };

            Arc::new(SqliteDataStore {
                pool: pool_opts.connect_lazy_with(opts),
            })
        }
        "postgres" => Arc::new(PostgresDataStore {
            pool: sqlx::postgres::PgPoolOptions::new()
                .connect_lazy(url)
                .map_err(|e| StorageError::Storage(format!("Failed to create Postgres pool: {e}")))?,
        }),
        t => {
            return Err(StorageError::Storage(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            )));
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sqlite_store() {
        let store = build_data_store("sqlite", "sqlite::memory:").expect("build");
        assert!(store.as_sqlite().is_some());
        assert!(store.as_postgres().is_none());
    }

    #[test]
    fn test_build_unsupported_store() {
        let result = build_data_store("mongodb", "mongodb://localhost");
        assert!(matches!(result, Err(StorageError::Storage(_))));
    }
}
