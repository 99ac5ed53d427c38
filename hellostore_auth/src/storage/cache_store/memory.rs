use async_trait::async_trait;
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.insert(key, value);
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        _ttl: usize,
    ) -> Result<(), StorageError> {
        // TTL is ignored here; expiry is enforced by the timestamp carried in
        // the stored payloads.
        let key = Self::make_key(prefix, key);
        self.entry.insert(key, value);
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        Ok(self.entry.get(&key).cloned())
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key() {
        assert_eq!(
            InMemoryCacheStore::make_key("session", "user123"),
            "cache:session:user123"
        );
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let mut store = InMemoryCacheStore::new();
        let value = CacheData {
            value: "test value".to_string(),
        };

        store.put("test", "key1", value).await.expect("put");

        let retrieved = store.get("test", "key1").await.expect("get");
        assert_eq!(retrieved.expect("present").value, "test value");
    }

    #[tokio::test]
    async fn test_remove() {
        let mut store = InMemoryCacheStore::new();
        let value = CacheData {
            value: "value to remove".to_string(),
        };

        store.put("test", "key3", value).await.expect("put");
        store.remove("test", "key3").await.expect("remove");

        assert!(store.get("test", "key3").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let store = InMemoryCacheStore::new();
        assert!(store.get("test", "nope").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn test_prefix_isolation() {
        let mut store = InMemoryCacheStore::new();
        let key = "same_key";

        store
            .put(
                "prefix1",
                key,
                CacheData {
                    value: "value for prefix1".to_string(),
                },
            )
            .await
            .expect("put");
        store
            .put(
                "prefix2",
                key,
                CacheData {
                    value: "value for prefix2".to_string(),
                },
            )
            .await
            .expect("put");

        let get1 = store.get("prefix1", key).await.expect("get").expect("some");
        let get2 = store.get("prefix2", key).await.expect("get").expect("some");

        assert_eq!(get1.value, "value for prefix1");
        assert_eq!(get2.value, "value for prefix2");
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let mut store = InMemoryCacheStore::new();

        store
            .put(
                "test",
                "key1",
                CacheData {
                    value: "original value".to_string(),
                },
            )
            .await
            .expect("put");
        store
            .put(
                "test",
                "key1",
                CacheData {
                    value: "new value".to_string(),
                },
            )
            .await
            .expect("put");

        let retrieved = store.get("test", "key1").await.expect("get").expect("some");
        assert_eq!(retrieved.value, "new value");
    }
}
