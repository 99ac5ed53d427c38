mod postgres;
mod sqlite;

use chrono::{DateTime, Utc};

use crate::storage::SharedDataStore;
use crate::userdb::errors::UserError;
use crate::userdb::types::{Role, User};

use postgres::*;
use sqlite::*;

/// Credential store over an injected relational backend.
///
/// Every method dispatches to the sqlite or postgres implementation of the
/// underlying pool; each call maps to a single statement, so the store's
/// native per-statement atomicity is all the serialization relied upon.
#[derive(Clone)]
pub struct UserStore {
    store: SharedDataStore,
}

impl UserStore {
    pub fn new(store: SharedDataStore) -> Self {
        Self { store }
    }

    /// Initialize the user table.
    pub async fn init(&self) -> Result<(), UserError> {
        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Look up a user by normalized email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            find_by_email_sqlite(pool, email).await
        } else if let Some(pool) = self.store.as_postgres() {
            find_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Look up a user by their opaque public identifier.
    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            find_by_external_id_sqlite(pool, external_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            find_by_external_id_postgres(pool, external_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Look up the record holding a verification token.
    pub async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            find_by_verification_token_sqlite(pool, token).await
        } else if let Some(pool) = self.store.as_postgres() {
            find_by_verification_token_postgres(pool, token).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn insert(&self, user: &User) -> Result<(), UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            insert_user_sqlite(pool, user).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Atomically mark the holder of `token` as verified and clear the token
    /// columns. Returns false when no record holds the token.
    pub async fn consume_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            consume_verification_token_sqlite(pool, token, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            consume_verification_token_postgres(pool, token, now).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn update_role_status(
        &self,
        external_id: &str,
        role: Role,
        account_status: &str,
    ) -> Result<(), UserError> {
        let now = Utc::now();
        if let Some(pool) = self.store.as_sqlite() {
            update_role_status_sqlite(pool, external_id, role, account_status, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_role_status_postgres(pool, external_id, role, account_status, now).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn update_profile(
        &self,
        external_id: &str,
        address: &str,
        contact_number: &str,
    ) -> Result<(), UserError> {
        let now = Utc::now();
        if let Some(pool) = self.store.as_sqlite() {
            update_profile_sqlite(pool, external_id, address, contact_number, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_profile_postgres(pool, external_id, address, contact_number, now).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn update_password_hash(
        &self,
        id: &str,
        password_hash: &str,
    ) -> Result<(), UserError> {
        let now = Utc::now();
        if let Some(pool) = self.store.as_sqlite() {
            update_password_hash_sqlite(pool, id, password_hash, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_password_hash_postgres(pool, id, password_hash, now).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn delete(&self, external_id: &str) -> Result<(), UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            delete_user_sqlite(pool, external_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_user_postgres(pool, external_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            list_all_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            list_all_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}
