use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::errors::SessionError;
use crate::storage::CacheData;
use crate::userdb::{AccountState, Role, User as DbUser};

/// Snapshot of the authenticated user held in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub is_email_verified: bool,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&DbUser> for SessionUser {
    fn from(user: &DbUser) -> Self {
        Self {
            id: user.id.clone(),
            external_id: user.external_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_email_verified: matches!(user.state, AccountState::Active),
        }
    }
}

/// Server-side session record keyed by the opaque session id.
///
/// `last_activity` is refreshed on every allowed non-public request; a
/// missing value means the session has accrued no idle time yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: SessionUser,
    pub last_activity: Option<DateTime<Utc>>,
}

impl From<StoredSession> for CacheData {
    fn from(data: StoredSession) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize StoredSession"),
        }
    }
}

impl TryFrom<CacheData> for StoredSession {
    type Error = SessionError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| SessionError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_db_user(state: AccountState) -> DbUser {
        DbUser::new_pending(
            "u-1".to_string(),
            "ext-1".to_string(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            "$argon2id$...".to_string(),
            "tok".to_string(),
            Utc::now() + Duration::hours(1),
        )
        .with_state(state)
    }

    trait WithState {
        fn with_state(self, state: AccountState) -> Self;
    }

    impl WithState for DbUser {
        fn with_state(mut self, state: AccountState) -> Self {
            self.state = state;
            self
        }
    }

    #[test]
    fn test_snapshot_from_active_user() {
        let user = sample_db_user(AccountState::Active);
        let snapshot = SessionUser::from(&user);

        assert_eq!(snapshot.external_id, "ext-1");
        assert_eq!(snapshot.email, "ada@example.com");
        assert!(snapshot.is_email_verified);
        assert!(!snapshot.is_admin());
    }

    #[test]
    fn test_snapshot_from_pending_user_is_unverified() {
        let user = sample_db_user(AccountState::PendingVerification {
            token: "tok".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        });
        let snapshot = SessionUser::from(&user);
        assert!(!snapshot.is_email_verified);
    }

    #[test]
    fn test_stored_session_cache_round_trip() {
        let user = sample_db_user(AccountState::Active);
        let stored = StoredSession {
            user: SessionUser::from(&user),
            last_activity: Some(Utc::now()),
        };

        let data: CacheData = stored.clone().into();
        let back = StoredSession::try_from(data).expect("deserialize");

        assert_eq!(back.user, stored.user);
        assert_eq!(back.last_activity, stored.last_activity);
    }

    #[test]
    fn test_stored_session_rejects_garbage() {
        let data = CacheData {
            value: "not json".to_string(),
        };
        assert!(StoredSession::try_from(data).is_err());
    }
}
