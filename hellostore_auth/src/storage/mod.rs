mod cache_store;
mod data_store;
mod errors;
mod types;

pub use cache_store::{CacheStore, SharedCacheStore, build_cache_store};
pub use data_store::{DataStore, SharedDataStore, build_data_store};
pub use errors::StorageError;
pub use types::CacheData;
