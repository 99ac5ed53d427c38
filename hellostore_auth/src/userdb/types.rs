use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::userdb::errors::UserError;

/// Role attached to a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            other => Err(UserError::InvalidData(format!("Unknown role: {other}"))),
        }
    }
}

/// Lifecycle state of a user record.
///
/// A record is created in `PendingVerification` carrying its verification
/// token; consuming the token moves it to `Active`. `Inactive` is an
/// administrative switch independent of verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountState {
    PendingVerification {
        token: String,
        expires_at: DateTime<Utc>,
    },
    Active,
    Inactive,
}

impl AccountState {
    pub fn label(&self) -> &'static str {
        match self {
            AccountState::PendingVerification { .. } => "pending verification",
            AccountState::Active => "active",
            AccountState::Inactive => "inactive",
        }
    }
}

/// A user record as seen by the rest of the crate.
///
/// The password hash stays inside the auth flows; it is never serialized or
/// rendered (see `UserOverview` for the listing shape).
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub state: AccountState,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user in `PendingVerification`.
    pub fn new_pending(
        id: String,
        external_id: String,
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        token: String,
        token_expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            external_id,
            first_name,
            last_name,
            email,
            password_hash,
            role: Role::Customer,
            state: AccountState::PendingVerification {
                token,
                expires_at: token_expires_at,
            },
            address: None,
            contact_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Trim whitespace and lowercase an email address for lookup and storage.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Flat database row for a user record.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub account_status: String,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let state = if row.account_status == "inactive" {
            AccountState::Inactive
        } else if row.is_email_verified {
            AccountState::Active
        } else {
            match (row.verification_token, row.token_expires_at) {
                (Some(token), Some(expires_at)) => {
                    AccountState::PendingVerification { token, expires_at }
                }
                _ => {
                    return Err(UserError::InvalidData(format!(
                        "Unverified user {} has no verification token",
                        row.id
                    )));
                }
            }
        };

        Ok(User {
            id: row.id,
            external_id: row.external_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role)?,
            state,
            address: row.address,
            contact_number: row.contact_number,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Column values derived from the tagged state, used when persisting.
pub(crate) struct StateColumns {
    pub account_status: &'static str,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl From<&AccountState> for StateColumns {
    fn from(state: &AccountState) -> Self {
        match state {
            AccountState::PendingVerification { token, expires_at } => StateColumns {
                account_status: "active",
                is_email_verified: false,
                verification_token: Some(token.clone()),
                token_expires_at: Some(*expires_at),
            },
            AccountState::Active => StateColumns {
                account_status: "active",
                is_email_verified: true,
                verification_token: None,
                token_expires_at: None,
            },
            AccountState::Inactive => StateColumns {
                account_status: "inactive",
                is_email_verified: false,
                verification_token: None,
                token_expires_at: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_row() -> UserRow {
        let now = Utc::now();
        UserRow {
            id: "u-1".to_string(),
            external_id: "ext-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "customer".to_string(),
            account_status: "active".to_string(),
            is_email_verified: true,
            verification_token: None,
            token_expires_at: None,
            address: None,
            contact_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("customer").expect("parse"), Role::Customer);
        assert_eq!(Role::from_str("admin").expect("parse"), Role::Admin);
        assert_eq!(Role::Admin.as_str(), "admin");
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_verified_row_maps_to_active() {
        let user = User::try_from(sample_row()).expect("convert");
        assert_eq!(user.state, AccountState::Active);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_inactive_status_wins_over_verification() {
        let mut row = sample_row();
        row.account_status = "inactive".to_string();
        let user = User::try_from(row).expect("convert");
        assert_eq!(user.state, AccountState::Inactive);
    }

    #[test]
    fn test_unverified_row_with_token_is_pending() {
        let mut row = sample_row();
        row.is_email_verified = false;
        row.verification_token = Some("tok".to_string());
        row.token_expires_at = Some(Utc::now() + Duration::hours(1));

        let user = User::try_from(row).expect("convert");
        match user.state {
            AccountState::PendingVerification { ref token, .. } => assert_eq!(token, "tok"),
            other => panic!("Expected pending state, got {other:?}"),
        }
    }

    #[test]
    fn test_unverified_row_without_token_is_rejected() {
        let mut row = sample_row();
        row.is_email_verified = false;
        row.verification_token = None;
        row.token_expires_at = None;

        assert!(matches!(
            User::try_from(row),
            Err(UserError::InvalidData(_))
        ));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert_eq!(normalize_email("plain@x.com"), "plain@x.com");
    }

    #[test]
    fn test_state_columns_for_pending() {
        let expires = Utc::now() + Duration::hours(1);
        let state = AccountState::PendingVerification {
            token: "tok".to_string(),
            expires_at: expires,
        };
        let cols = StateColumns::from(&state);
        assert_eq!(cols.account_status, "active");
        assert!(!cols.is_email_verified);
        assert_eq!(cols.verification_token.as_deref(), Some("tok"));
        assert_eq!(cols.token_expires_at, Some(expires));
    }

    #[test]
    fn test_state_columns_for_active() {
        let cols = StateColumns::from(&AccountState::Active);
        assert_eq!(cols.account_status, "active");
        assert!(cols.is_email_verified);
        assert!(cols.verification_token.is_none());
    }
}
