//! Time-boxed single-use tokens.
//!
//! Email verification tokens live on the user record and are consumed by the
//! credential store in one atomic update. Password reset tokens live in the
//! cache store under their own prefix and are consumed by delete-on-use.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::config::{PASSWORD_RESET_TOKEN_TTL, VERIFICATION_TOKEN_TTL};
use crate::storage::{CacheData, SharedCacheStore, StorageError};
use crate::utils::{UtilError, gen_random_string};

const RESET_PREFIX: &str = "pwreset";

/// Issue a fresh email verification token with its absolute expiry instant.
pub fn issue_verification_token() -> Result<(String, DateTime<Utc>), UtilError> {
    let token = gen_random_string(32)?;
    let expires_at = Utc::now() + Duration::seconds(*VERIFICATION_TOKEN_TTL as i64);
    Ok((token, expires_at))
}

pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

/// Constant-time token comparison.
pub fn tokens_match(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredResetToken {
    user_id: String,
    expires_at: DateTime<Utc>,
    ttl: u64,
}

/// Password reset tokens over the injected cache store.
#[derive(Clone)]
pub struct ResetTokenService {
    cache: SharedCacheStore,
}

impl ResetTokenService {
    pub fn new(cache: SharedCacheStore) -> Self {
        Self { cache }
    }

    /// Issue a reset token bound to `user_id`.
    pub async fn issue(&self, user_id: &str) -> Result<String, StorageError> {
        let token =
            gen_random_string(32).map_err(|e| StorageError::Storage(e.to_string()))?;
        let ttl = *PASSWORD_RESET_TOKEN_TTL;
        let stored = StoredResetToken {
            user_id: user_id.to_string(),
            expires_at: Utc::now() + Duration::seconds(ttl as i64),
            ttl,
        };

        self.cache
            .lock()
            .await
            .put_with_ttl(
                RESET_PREFIX,
                &token,
                CacheData {
                    value: serde_json::to_string(&stored)?,
                },
                ttl as usize,
            )
            .await?;

        Ok(token)
    }

    /// Consume a reset token, returning the bound user id.
    ///
    /// The token is removed on first use. Expiry is checked against the
    /// stored instant because the in-memory backend keeps entries past their
    /// TTL.
    pub async fn consume(&self, token: &str) -> Result<Option<String>, StorageError> {
        let mut cache = self.cache.lock().await;

        let Some(data) = cache.get(RESET_PREFIX, token).await? else {
            return Ok(None);
        };
        let stored: StoredResetToken = serde_json::from_str(&data.value)?;

        cache.remove(RESET_PREFIX, token).await?;

        if is_expired(stored.expires_at, Utc::now()) {
            return Ok(None);
        }
        Ok(Some(stored.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::build_cache_store;

    #[test]
    fn test_issue_verification_token_shape() {
        let (token, expires_at) = issue_verification_token().expect("issue");
        assert_eq!(token.len(), 43);
        assert!(expires_at > Utc::now());
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        assert!(is_expired(now - Duration::seconds(1), now));
        assert!(!is_expired(now + Duration::seconds(1), now));
        assert!(!is_expired(now, now));
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "abcd"));
    }

    #[tokio::test]
    async fn test_reset_token_round_trip() {
        let cache = build_cache_store("memory", None).await.expect("cache");
        let service = ResetTokenService::new(cache);

        let token = service.issue("u-1").await.expect("issue");
        let user_id = service.consume(&token).await.expect("consume");
        assert_eq!(user_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_reset_token_single_use() {
        let cache = build_cache_store("memory", None).await.expect("cache");
        let service = ResetTokenService::new(cache);

        let token = service.issue("u-1").await.expect("issue");
        assert!(service.consume(&token).await.expect("consume").is_some());
        assert!(service.consume(&token).await.expect("consume").is_none());
    }

    #[tokio::test]
    async fn test_unknown_reset_token() {
        let cache = build_cache_store("memory", None).await.expect("cache");
        let service = ResetTokenService::new(cache);

        assert!(service.consume("bogus").await.expect("consume").is_none());
    }
}
