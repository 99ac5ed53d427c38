use chrono::{DateTime, Utc};
use http::header::{COOKIE, HeaderMap};

use crate::config::{SESSION_COOKIE_NAME, SESSION_IDLE_TIMEOUT};
use crate::session::errors::SessionError;
use crate::session::types::{SessionUser, StoredSession};
use crate::storage::SharedCacheStore;
use crate::utils::gen_random_string;

const SESSION_PREFIX: &str = "session";

// Cache entries outlive the idle window by a margin so the idle check in the
// access gate, not the cache TTL, is what decides expiry.
const TTL_MARGIN_SECS: u64 = 60;

/// Server-side session store over an injected cache backend.
///
/// Sessions are exclusively owned here; the access gate and auth flows go
/// through these methods and never touch the cache directly.
#[derive(Clone)]
pub struct SessionStore {
    cache: SharedCacheStore,
}

impl SessionStore {
    pub fn new(cache: SharedCacheStore) -> Self {
        Self { cache }
    }

    fn ttl() -> usize {
        (*SESSION_IDLE_TIMEOUT + TTL_MARGIN_SECS) as usize
    }

    /// Create a new session for an authenticated user, returning its id.
    pub async fn create(&self, user: SessionUser) -> Result<String, SessionError> {
        let session_id = gen_random_string(32)?;
        let stored = StoredSession {
            user,
            last_activity: Some(Utc::now()),
        };

        self.cache
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, &session_id, stored.into(), Self::ttl())
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        Ok(session_id)
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<StoredSession>, SessionError> {
        let cached = self
            .cache
            .lock()
            .await
            .get(SESSION_PREFIX, session_id)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        cached.map(StoredSession::try_from).transpose()
    }

    /// Sliding-window renewal: rewrite the session with a fresh activity
    /// timestamp.
    pub async fn touch(
        &self,
        session_id: &str,
        mut stored: StoredSession,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        stored.last_activity = Some(now);
        self.cache
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, session_id, stored.into(), Self::ttl())
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    pub async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        self.cache
            .lock()
            .await
            .remove(SESSION_PREFIX, session_id)
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }

    /// Overwrite a session record in place (used to backdate activity in
    /// tests and to refresh the snapshot after profile updates).
    pub async fn put(&self, session_id: &str, stored: StoredSession) -> Result<(), SessionError> {
        self.cache
            .lock()
            .await
            .put_with_ttl(SESSION_PREFIX, session_id, stored.into(), Self::ttl())
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))
    }
}

/// Extract the session id from the Cookie header, if any.
pub fn get_session_id_from_headers(headers: &HeaderMap) -> Result<Option<&str>, SessionError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::error!("Invalid cookie header: {}", e);
        SessionError::HeaderError("Invalid cookie header".to_string())
    })?;

    let cookie_name = SESSION_COOKIE_NAME.as_str();

    let session_id = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v),
            _ => None,
        }
    });

    Ok(session_id)
}
