mod memory;
mod redis;
mod types;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;

pub use types::CacheStore;
use types::{InMemoryCacheStore, RedisCacheStore};

/// Shared handle to a cache store, passed explicitly to the components that
/// need one instead of living in a process-wide global.
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

/// Build a cache store from configuration.
///
/// Supported kinds are "memory" and "redis" (the latter requires a URL).
pub async fn build_cache_store(
    kind: &str,
    url: Option<&str>,
) -> Result<SharedCacheStore, StorageError> {
    tracing::info!("Initializing cache store with type: {}", kind);

    let store: Box<dyn CacheStore> = match kind {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => {
            let url = url.ok_or_else(|| {
                StorageError::Storage("CACHE_STORE_URL must be set for redis".to_string())
            })?;
            let client = ::redis::Client::open(url)
                .map_err(|e| StorageError::Storage(format!("Failed to create Redis client: {e}")))?;
            let store = RedisCacheStore { client };
            store.init().await?;
            Box::new(store)
        }
        t => {
            return Err(StorageError::Storage(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    Ok(Arc::new(Mutex::new(store)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::CacheData;

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_cache_store("memory", None).await.expect("build");

        {
            let mut cache = store.lock().await;
            cache
                .put(
                    "test",
                    "key",
                    CacheData {
                        value: "hello".to_string(),
                    },
                )
                .await
                .expect("put");
        }

        let cache = store.lock().await;
        let got = cache.get("test", "key").await.expect("get").expect("some");
        assert_eq!(got.value, "hello");
    }

    #[tokio::test]
    async fn test_build_unsupported_store() {
        let result = build_cache_store("memcached", None).await;
        assert!(matches!(result, Err(StorageError::Storage(_))));
    }

    #[tokio::test]
    async fn test_build_redis_store_requires_url() {
        let result = build_cache_store("redis", None).await;
        assert!(matches!(result, Err(StorageError::Storage(_))));
    }
}
