use serde::{Deserialize, Serialize};

/// Opaque value stored in the cache store. Callers serialize their own
/// payloads into `value` and convert back on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheData {
    pub value: String,
}
